//! Bundled kanji dataset.
//!
//! The dataset ships with the binary as JSON and defines the catalog:
//! characters, readings, deck and group assignment, visual components
//! and example sentences. Entry order in the file is the curriculum
//! order. It is parsed and validated once at startup; the resulting
//! [`ComponentIndex`] is immutable and shared behind the application
//! state.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Example sentence attached to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub jp: String,
    pub en: String,
}

/// One kanji in the bundled catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiEntry {
    pub character: String,
    pub meaning: String,
    #[serde(default)]
    pub onyomi: Vec<String>,
    #[serde(default)]
    pub kunyomi: Vec<String>,
    pub deck: String,
    pub group_key: String,
    /// Visual components used for related-kanji lookup. Components may
    /// be catalog entries themselves or bare radicals.
    pub components: Vec<String>,
    #[serde(default)]
    pub example: Option<Example>,
}

/// Parse and validate the bundled dataset.
///
/// Rejects an empty dataset, duplicate characters and entries without
/// components. Entry order is preserved.
pub fn parse_dataset(json: &str) -> Result<Vec<KanjiEntry>, DatasetError> {
    let entries: Vec<KanjiEntry> = serde_json::from_str(json)?;
    if entries.is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.character.clone()) {
            return Err(DatasetError::DuplicateCharacter {
                character: entry.character.clone(),
            });
        }
        if entry.components.is_empty() {
            return Err(DatasetError::MissingComponents {
                character: entry.character.clone(),
            });
        }
    }

    Ok(entries)
}

/// A related-kanji suggestion with its overlap evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedKanji {
    pub character: String,
    pub shared_components: Vec<String>,
}

/// Component overlap lookup, built once from the dataset.
#[derive(Debug)]
pub struct ComponentIndex {
    by_component: HashMap<String, Vec<String>>,
    components_of: HashMap<String, Vec<String>>,
}

impl ComponentIndex {
    /// Build the index from parsed entries.
    ///
    /// Every kanji counts as a component of itself, so a compound that
    /// contains a catalog character (時 contains 寺) connects to it even
    /// though their listed component sets do not intersect.
    pub fn build(entries: &[KanjiEntry]) -> Self {
        let mut by_component: HashMap<String, Vec<String>> = HashMap::new();
        let mut components_of = HashMap::new();

        for entry in entries {
            let mut components = entry.components.clone();
            if !components.contains(&entry.character) {
                components.push(entry.character.clone());
            }
            for component in &components {
                by_component
                    .entry(component.clone())
                    .or_default()
                    .push(entry.character.clone());
            }
            components_of.insert(entry.character.clone(), components);
        }

        Self {
            by_component,
            components_of,
        }
    }

    /// Kanji sharing at least one component with `character`, strongest
    /// overlap first; ties order by character. Unknown characters yield
    /// an empty list.
    pub fn related(&self, character: &str) -> Vec<RelatedKanji> {
        let components = match self.components_of.get(character) {
            Some(components) => components,
            None => return Vec::new(),
        };

        let mut shared: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for component in components {
            if let Some(members) = self.by_component.get(component) {
                for member in members {
                    if member != character {
                        shared
                            .entry(member.clone())
                            .or_default()
                            .push(component.clone());
                    }
                }
            }
        }

        let mut related: Vec<RelatedKanji> = shared
            .into_iter()
            .map(|(character, shared_components)| RelatedKanji {
                character,
                shared_components,
            })
            .collect();
        related.sort_by(|a, b| {
            b.shared_components
                .len()
                .cmp(&a.shared_components.len())
                .then_with(|| a.character.cmp(&b.character))
        });
        related
    }

    /// Number of indexed characters.
    pub fn len(&self) -> usize {
        self.components_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components_of.is_empty()
    }
}
