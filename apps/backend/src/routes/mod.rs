pub mod auth;
pub mod decks;
pub mod kanji;
pub mod learn;
pub mod study;
pub mod users;
