//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user from a hashed bearer token
    pub async fn create_user(&self, token_hash: &str, name: Option<&str>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (token_hash, name)
            VALUES ($1, $2)
            RETURNING id, token_hash, name, curriculum_pos, created_at, last_seen_at
            "#,
        )
        .bind(token_hash)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by hashed token
    pub async fn get_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token_hash, name, curriculum_pos, created_at, last_seen_at
            FROM users
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token_hash, name, curriculum_pos, created_at, last_seen_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Move the curriculum cursor forward. The cursor never moves
    /// backwards, so repeating a lesson cannot rewind progress.
    pub async fn advance_curriculum(&self, user_id: Uuid, position: i32) -> Result<i32> {
        let cursor: i32 = sqlx::query_scalar(
            r#"
            UPDATE users
            SET curriculum_pos = GREATEST(curriculum_pos, $2)
            WHERE id = $1
            RETURNING curriculum_pos
            "#,
        )
        .bind(user_id)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;

        Ok(cursor)
    }

    /// Lifetime answer totals across all of a user's records
    pub async fn get_user_totals(&self, user_id: Uuid) -> Result<UserTotals> {
        let totals = sqlx::query_as::<_, UserTotals>(
            r#"
            SELECT COUNT(id) AS enrolled,
                   COALESCE(SUM(seen), 0) AS seen,
                   COALESCE(SUM(correct), 0) AS correct,
                   COALESCE(SUM(wrong), 0) AS wrong
            FROM review_states
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    // === Kanji Catalog ===

    /// Insert catalog entries that are not present yet. Existing rows
    /// are never overwritten, so the seed is idempotent.
    pub async fn seed_catalog(&self, entries: &[KanjiEntry]) -> Result<usize> {
        let mut created = 0;
        for (index, entry) in entries.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO kanji (character, meaning, onyomi, kunyomi, deck, group_key,
                                   order_index, example_jp, example_en)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (character) DO NOTHING
                "#,
            )
            .bind(&entry.character)
            .bind(&entry.meaning)
            .bind(&entry.onyomi)
            .bind(&entry.kunyomi)
            .bind(&entry.deck)
            .bind(&entry.group_key)
            .bind(index as i32)
            .bind(entry.example.as_ref().map(|e| e.jp.as_str()))
            .bind(entry.example.as_ref().map(|e| e.en.as_str()))
            .execute(&self.pool)
            .await?;

            created += result.rows_affected() as usize;
        }
        Ok(created)
    }

    /// Get kanji by catalog ID
    pub async fn get_kanji(&self, kanji_id: i64) -> Result<Option<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE id = $1
            "#,
        )
        .bind(kanji_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get kanji by character
    pub async fn get_kanji_by_character(&self, character: &str) -> Result<Option<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE character = $1
            "#,
        )
        .bind(character)
        .fetch_optional(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get kanji for a set of catalog IDs. Unknown IDs are skipped.
    pub async fn get_kanji_by_ids(&self, kanji_ids: &[i64]) -> Result<Vec<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE id = ANY($1)
            ORDER BY order_index
            "#,
        )
        .bind(kanji_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get kanji for a set of characters. Unknown characters are skipped.
    pub async fn get_kanji_by_characters(&self, characters: &[String]) -> Result<Vec<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE character = ANY($1)
            ORDER BY order_index
            "#,
        )
        .bind(characters)
        .fetch_all(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get all kanji in a deck, in curriculum order
    pub async fn get_kanji_for_deck(&self, deck: &str) -> Result<Vec<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE deck = $1
            ORDER BY order_index
            "#,
        )
        .bind(deck)
        .fetch_all(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get all kanji in a group, in curriculum order
    pub async fn get_kanji_for_group(&self, group_key: &str) -> Result<Vec<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE group_key = $1
            ORDER BY order_index
            "#,
        )
        .bind(group_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get the whole catalog, in curriculum order
    pub async fn get_all_kanji(&self) -> Result<Vec<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            ORDER BY order_index
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Get the next catalog slice from a curriculum position
    pub async fn get_catalog_slice(&self, start_order: i32, limit: i64) -> Result<Vec<DbKanji>> {
        let kanji = sqlx::query_as::<_, DbKanji>(
            r#"
            SELECT id, character, meaning, onyomi, kunyomi, deck, group_key,
                   order_index, example_jp, example_en, created_at
            FROM kanji
            WHERE order_index >= $1
            ORDER BY order_index
            LIMIT $2
            "#,
        )
        .bind(start_order)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(kanji)
    }

    /// Count catalog entries at or past a curriculum position
    pub async fn count_catalog_from(&self, start_order: i32) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM kanji
            WHERE order_index >= $1
            "#,
        )
        .bind(start_order)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // === Review Record Store ===

    /// Get a user's record for one card
    pub async fn get_review_state(
        &self,
        user_id: Uuid,
        kanji_id: i64,
    ) -> Result<Option<DbReviewState>> {
        let state = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT id, user_id, kanji_id, deck, group_key, due_at, ease_factor,
                   interval_days, learning_step, reps, lapses, seen, correct, wrong,
                   last_correct, last_answer_ms, avg_answer_ms, last_answered_at,
                   last_reviewed_at, created_at, updated_at
            FROM review_states
            WHERE user_id = $1 AND kanji_id = $2
            "#,
        )
        .bind(user_id)
        .bind(kanji_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    /// Get all records due at or before `now`, optionally filtered by
    /// deck. Ordered by due time then catalog ID so ranking ties are
    /// deterministic.
    pub async fn get_due_states(
        &self,
        user_id: Uuid,
        deck: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<DbReviewState>> {
        let states = match deck {
            Some(deck) => {
                sqlx::query_as::<_, DbReviewState>(
                    r#"
                    SELECT id, user_id, kanji_id, deck, group_key, due_at, ease_factor,
                           interval_days, learning_step, reps, lapses, seen, correct, wrong,
                           last_correct, last_answer_ms, avg_answer_ms, last_answered_at,
                           last_reviewed_at, created_at, updated_at
                    FROM review_states
                    WHERE user_id = $1 AND deck = $2 AND due_at <= $3
                    ORDER BY due_at, kanji_id
                    "#,
                )
                .bind(user_id)
                .bind(deck)
                .bind(now)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DbReviewState>(
                    r#"
                    SELECT id, user_id, kanji_id, deck, group_key, due_at, ease_factor,
                           interval_days, learning_step, reps, lapses, seen, correct, wrong,
                           last_correct, last_answer_ms, avg_answer_ms, last_answered_at,
                           last_reviewed_at, created_at, updated_at
                    FROM review_states
                    WHERE user_id = $1 AND due_at <= $2
                    ORDER BY due_at, kanji_id
                    "#,
                )
                .bind(user_id)
                .bind(now)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(states)
    }

    /// Enroll cards by inserting fresh records. Existing records are
    /// left untouched; returns the number actually created.
    pub async fn seed_review_states(
        &self,
        user_id: Uuid,
        kanji: &[DbKanji],
        fresh: &ReviewState,
    ) -> Result<usize> {
        let mut created = 0;
        for entry in kanji {
            let row = DbReviewState::from_core_state(user_id, entry, fresh);
            let result = sqlx::query(
                r#"
                INSERT INTO review_states (user_id, kanji_id, deck, group_key, due_at,
                                           ease_factor, interval_days, learning_step, reps,
                                           lapses, seen, correct, wrong, last_correct,
                                           last_answer_ms, avg_answer_ms)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                ON CONFLICT (user_id, kanji_id) DO NOTHING
                "#,
            )
            .bind(row.user_id)
            .bind(row.kanji_id)
            .bind(&row.deck)
            .bind(&row.group_key)
            .bind(row.due_at)
            .bind(row.ease_factor)
            .bind(row.interval_days)
            .bind(row.learning_step)
            .bind(row.reps)
            .bind(row.lapses)
            .bind(row.seen)
            .bind(row.correct)
            .bind(row.wrong)
            .bind(row.last_correct)
            .bind(row.last_answer_ms)
            .bind(row.avg_answer_ms)
            .execute(&self.pool)
            .await?;

            created += result.rows_affected() as usize;
        }
        Ok(created)
    }

    /// Atomically apply one answer: lock the user's record for the
    /// card, run `update` on the current state, persist the result.
    ///
    /// Concurrent answers for the same card serialize on the row lock,
    /// so a transition is never applied from a stale read. A missing
    /// record reaches `update` as `None` and is created by the upsert.
    pub async fn submit_answer<F>(
        &self,
        user_id: Uuid,
        kanji: &DbKanji,
        update: F,
    ) -> Result<DbReviewState>
    where
        F: FnOnce(Option<ReviewState>) -> ReviewState + Send,
    {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT id, user_id, kanji_id, deck, group_key, due_at, ease_factor,
                   interval_days, learning_step, reps, lapses, seen, correct, wrong,
                   last_correct, last_answer_ms, avg_answer_ms, last_answered_at,
                   last_reviewed_at, created_at, updated_at
            FROM review_states
            WHERE user_id = $1 AND kanji_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(kanji.id)
        .fetch_optional(&mut *tx)
        .await?;

        let next = update(existing.map(|row| row.to_core_state()));
        let row = DbReviewState::from_core_state(user_id, kanji, &next);

        let written = sqlx::query_as::<_, DbReviewState>(
            r#"
            INSERT INTO review_states (user_id, kanji_id, deck, group_key, due_at,
                                       ease_factor, interval_days, learning_step, reps,
                                       lapses, seen, correct, wrong, last_correct,
                                       last_answer_ms, avg_answer_ms, last_answered_at,
                                       last_reviewed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (user_id, kanji_id) DO UPDATE SET
                due_at = EXCLUDED.due_at,
                ease_factor = EXCLUDED.ease_factor,
                interval_days = EXCLUDED.interval_days,
                learning_step = EXCLUDED.learning_step,
                reps = EXCLUDED.reps,
                lapses = EXCLUDED.lapses,
                seen = EXCLUDED.seen,
                correct = EXCLUDED.correct,
                wrong = EXCLUDED.wrong,
                last_correct = EXCLUDED.last_correct,
                last_answer_ms = EXCLUDED.last_answer_ms,
                avg_answer_ms = EXCLUDED.avg_answer_ms,
                last_answered_at = EXCLUDED.last_answered_at,
                last_reviewed_at = EXCLUDED.last_reviewed_at,
                updated_at = NOW()
            RETURNING id, user_id, kanji_id, deck, group_key, due_at, ease_factor,
                      interval_days, learning_step, reps, lapses, seen, correct, wrong,
                      last_correct, last_answer_ms, avg_answer_ms, last_answered_at,
                      last_reviewed_at, created_at, updated_at
            "#,
        )
        .bind(row.user_id)
        .bind(row.kanji_id)
        .bind(&row.deck)
        .bind(&row.group_key)
        .bind(row.due_at)
        .bind(row.ease_factor)
        .bind(row.interval_days)
        .bind(row.learning_step)
        .bind(row.reps)
        .bind(row.lapses)
        .bind(row.seen)
        .bind(row.correct)
        .bind(row.wrong)
        .bind(row.last_correct)
        .bind(row.last_answer_ms)
        .bind(row.avg_answer_ms)
        .bind(row.last_answered_at)
        .bind(row.last_reviewed_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(written)
    }

    /// Delete all of a user's records and rewind the curriculum cursor
    pub async fn reset_progress(&self, user_id: Uuid) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            DELETE FROM review_states
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET curriculum_pos = 0
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() as usize)
    }

    // === Deck Repository ===

    /// Get per-deck counts over the whole catalog
    pub async fn get_deck_infos(&self, user_id: Uuid) -> Result<Vec<DeckInfo>> {
        let decks = sqlx::query_as::<_, DeckInfo>(
            r#"
            SELECT
                k.deck,
                COUNT(k.id) AS total,
                COUNT(rs.id) AS enrolled,
                COUNT(CASE WHEN rs.due_at <= NOW() THEN 1 END) AS due
            FROM kanji k
            LEFT JOIN review_states rs ON rs.kanji_id = k.id AND rs.user_id = $1
            GROUP BY k.deck
            ORDER BY k.deck
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(decks)
    }

    /// Get deck statistics. Returns None for decks absent from the
    /// catalog.
    pub async fn get_deck_stats(
        &self,
        user_id: Uuid,
        deck: &str,
        graduated_step: i16,
    ) -> Result<Option<DeckStatsResponse>> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(k.id) AS total,
                COUNT(rs.id) AS enrolled,
                COUNT(CASE WHEN rs.learning_step < $3 THEN 1 END) AS learning,
                COUNT(CASE WHEN rs.learning_step >= $3 THEN 1 END) AS graduated,
                COUNT(CASE WHEN rs.due_at <= NOW() THEN 1 END) AS due_now,
                COALESCE(SUM(rs.lapses), 0) AS lapses,
                COALESCE(AVG(rs.ease_factor), 2.5)::FLOAT8 AS average_ease,
                COALESCE(AVG(rs.interval_days), 0)::FLOAT8 AS average_interval,
                COALESCE(SUM(rs.seen), 0) AS seen,
                COALESCE(SUM(rs.correct), 0) AS correct
            FROM kanji k
            LEFT JOIN review_states rs ON rs.kanji_id = k.id AND rs.user_id = $1
            WHERE k.deck = $2
            "#,
        )
        .bind(user_id)
        .bind(deck)
        .bind(graduated_step)
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.get("total");
        if total == 0 {
            return Ok(None);
        }

        let seen: i64 = row.get("seen");
        let correct: i64 = row.get("correct");
        let accuracy = if seen > 0 {
            correct as f64 / seen as f64
        } else {
            0.0
        };

        Ok(Some(DeckStatsResponse {
            deck: deck.to_string(),
            total: total as usize,
            enrolled: row.get::<i64, _>("enrolled") as usize,
            learning: row.get::<i64, _>("learning") as usize,
            graduated: row.get::<i64, _>("graduated") as usize,
            due_now: row.get::<i64, _>("due_now") as usize,
            lapses: row.get::<i64, _>("lapses") as usize,
            average_ease: row.get("average_ease"),
            average_interval: row.get("average_interval"),
            accuracy,
        }))
    }
}
