//! Per-variant identifier tables.
//!
//! Modern client builds renumber their headers between revisions, so the
//! table is data: it starts from built-in defaults and can be patched from
//! a `key=value` file of the form
//!
//! ```text
//! In.CantConnect=899
//! Out.PlaceObject=1258
//! ```

use std::collections::HashMap;

use parlor_gamedata::KeyValueMap;

use crate::{Direction, Header, Identifier, Variant};

/// One variant's identifier ↔ header mapping, per direction.
#[derive(Debug, Clone, Default)]
struct VariantTable {
    headers: HashMap<(Direction, String), Header>,
    names: HashMap<(Direction, Header), String>,
}

impl VariantTable {
    fn insert(&mut self, direction: Direction, name: &str, header: Header) {
        if let Some(previous) = self.headers.insert((direction, name.to_owned()), header) {
            if previous != header {
                self.names.remove(&(direction, previous));
            }
        }
        self.names.insert((direction, header), name.to_owned());
    }
}

/// Maps symbolic identifiers to numeric headers, separately per variant.
///
/// There is deliberately no lookup that spans variants: every query names
/// exactly one [`Variant`].
#[derive(Debug, Clone, Default)]
pub struct IdentifierTable {
    variants: HashMap<Variant, VariantTable>,
}

impl IdentifierTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `identifier` to `header` on `variant`, replacing any previous
    /// binding for that identifier.
    pub fn insert(&mut self, variant: Variant, identifier: Identifier, header: Header) -> &mut Self {
        self.variants
            .entry(variant)
            .or_default()
            .insert(identifier.direction, identifier.name, header);
        self
    }

    /// The header bound to `identifier` on `variant`.
    pub fn header(&self, variant: Variant, identifier: Identifier) -> Option<Header> {
        self.header_by_name(variant, identifier.direction, identifier.name)
    }

    /// Like [`header`](Self::header) with a runtime name.
    pub fn header_by_name(&self, variant: Variant, direction: Direction, name: &str) -> Option<Header> {
        self.variants
            .get(&variant)?
            .headers
            .get(&(direction, name.to_owned()))
            .copied()
    }

    /// The identifier name bound to `header` on `variant`, for logging.
    pub fn name(&self, variant: Variant, direction: Direction, header: Header) -> Option<&str> {
        self.variants
            .get(&variant)?
            .names
            .get(&(direction, header))
            .map(String::as_str)
    }

    /// Number of bindings on `variant`.
    pub fn len(&self, variant: Variant) -> usize {
        self.variants.get(&variant).map_or(0, |t| t.headers.len())
    }

    /// Applies `In.Name=header` / `Out.Name=header` entries to `variant`.
    ///
    /// Entries with an unknown direction prefix or a non-numeric header are
    /// skipped with a warning. Returns the number of bindings applied.
    pub fn apply_overrides(&mut self, variant: Variant, overrides: &KeyValueMap) -> usize {
        let mut applied = 0;
        for (key, value) in overrides.iter() {
            let parsed = key.split_once('.').and_then(|(prefix, name)| {
                let direction = match prefix {
                    "In" => Direction::Incoming,
                    "Out" => Direction::Outgoing,
                    _ => return None,
                };
                (!name.is_empty()).then_some((direction, name))
            });
            let Some((direction, name)) = parsed else {
                tracing::warn!(%variant, key, "identifier override is not In.<name> or Out.<name>");
                continue;
            };
            let Ok(header) = value.trim().parse::<u16>() else {
                tracing::warn!(%variant, key, value, "identifier override with invalid header");
                continue;
            };

            self.variants
                .entry(variant)
                .or_default()
                .insert(direction, name, Header(header));
            applied += 1;
        }
        tracing::debug!(%variant, applied, "identifier overrides applied");
        applied
    }
}
