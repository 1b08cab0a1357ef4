//! Bundled kanji catalog
//!
//! The dataset ships inside the binary. At startup it is parsed,
//! validated, seeded into the catalog table (insert-if-absent) and
//! turned into the component overlap index.

use std::sync::Arc;

use srs_core::{parse_dataset, ComponentIndex, KanjiEntry};

use crate::db::Database;
use crate::error::Result;

/// Dataset shipped with the binary. Entry order is the curriculum order.
const KANJI_DATASET: &str = include_str!("../../data/kanji.json");

/// Parse and validate the bundled dataset.
pub fn load_entries() -> Result<Vec<KanjiEntry>> {
    Ok(parse_dataset(KANJI_DATASET)?)
}

/// Seed the catalog and build the component index. Safe to run on
/// every startup; existing catalog rows are never overwritten.
pub async fn initialize(db: &Database) -> Result<(usize, Arc<ComponentIndex>)> {
    let entries = load_entries()?;
    let created = db.seed_catalog(&entries).await?;
    let index = ComponentIndex::build(&entries);

    tracing::info!(
        "Catalog ready: {} entries, {} indexed for component lookup",
        entries.len(),
        index.len()
    );

    Ok((created, Arc::new(index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_parses_cleanly() {
        let entries = load_entries().expect("bundled dataset must validate");
        assert!(!entries.is_empty());
    }

    #[test]
    fn bundled_dataset_connects_the_temple_family() {
        // 時, 持, 待, 特 and 詩 all contain 寺.
        let entries = load_entries().unwrap();
        let index = ComponentIndex::build(&entries);

        let related: Vec<String> = index
            .related("寺")
            .into_iter()
            .map(|r| r.character)
            .collect();
        for character in ["時", "持", "待", "特", "詩"] {
            assert!(
                related.contains(&character.to_string()),
                "{} should be related to 寺",
                character
            );
        }
    }

    #[test]
    fn bundled_dataset_keeps_decks_contiguous() {
        // Curriculum order walks jlpt-n5 before jlpt-n4.
        let entries = load_entries().unwrap();
        let first_n4 = entries.iter().position(|e| e.deck == "jlpt-n4").unwrap();
        assert!(entries[..first_n4].iter().all(|e| e.deck == "jlpt-n5"));
        assert!(entries[first_n4..].iter().all(|e| e.deck == "jlpt-n4"));
    }
}
