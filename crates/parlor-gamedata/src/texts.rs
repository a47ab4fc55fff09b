//! External texts: the client's localization table.
//!
//! Most lookups are built from a fixed key template, e.g. an effect's
//! name lives under `fx_{id}` and its description under `fx_{id}_desc`.

use std::ops::Deref;
use std::path::Path;

use crate::{GameDataError, KeyValueMap};

const HAND_ITEM_PREFIX: &str = "handitem";

/// The external texts table with typed lookups.
///
/// Derefs to [`KeyValueMap`] for raw key access.
#[derive(Debug, Clone, Default)]
pub struct ExternalTexts {
    map: KeyValueMap,
}

impl ExternalTexts {
    /// Loads external texts from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameDataError> {
        KeyValueMap::load(path).map(Self::from)
    }

    /// Parses external texts from an in-memory string.
    pub fn parse(text: &str) -> Self {
        KeyValueMap::parse("external texts", text).into()
    }

    /// Poster name by variant, from `poster_{variant}_name`.
    pub fn poster_name(&self, variant: &str) -> Option<&str> {
        self.map.get(&format!("poster_{variant}_name"))
    }

    /// Poster description by variant, from `poster_{variant}_desc`.
    pub fn poster_description(&self, variant: &str) -> Option<&str> {
        self.map.get(&format!("poster_{variant}_desc"))
    }

    /// Badge name by code.
    ///
    /// Tries `badge_name_{code}` first, then the older `{code}_badge_name`.
    pub fn badge_name(&self, code: &str) -> Option<&str> {
        self.map
            .get(&format!("badge_name_{code}"))
            .or_else(|| self.map.get(&format!("{code}_badge_name")))
    }

    /// Badge description by code, from `badge_desc_{code}`.
    pub fn badge_description(&self, code: &str) -> Option<&str> {
        self.map.get(&format!("badge_desc_{code}"))
    }

    /// Effect name by id, from `fx_{id}`.
    pub fn effect_name(&self, id: i32) -> Option<&str> {
        self.map.get(&format!("fx_{id}"))
    }

    /// Effect description by id, from `fx_{id}_desc`.
    pub fn effect_description(&self, id: i32) -> Option<&str> {
        self.map.get(&format!("fx_{id}_desc"))
    }

    /// Hand item name by id, from `handitem{id}`.
    pub fn hand_item_name(&self, id: i32) -> Option<&str> {
        self.map.get(&format!("{HAND_ITEM_PREFIX}{id}"))
    }

    /// All hand item ids whose name matches `name`, ignoring case
    /// (Unicode lowercase, not just ASCII).
    ///
    /// Returned in ascending order.
    pub fn hand_item_ids(&self, name: &str) -> Vec<i32> {
        let name = name.to_lowercase();
        let mut ids: Vec<i32> = self
            .map
            .iter()
            .filter(|(_, value)| value.to_lowercase() == name)
            .filter_map(|(key, _)| key.strip_prefix(HAND_ITEM_PREFIX))
            .filter_map(|suffix| suffix.parse().ok())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl From<KeyValueMap> for ExternalTexts {
    fn from(map: KeyValueMap) -> Self {
        Self { map }
    }
}

impl Deref for ExternalTexts {
    type Target = KeyValueMap;

    fn deref(&self) -> &KeyValueMap {
        &self.map
    }
}
