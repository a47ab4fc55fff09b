//! Game data loaders for Parlor.
//!
//! The game client ships several plain-text lookup tables: one
//! `key=value` entry per line. This crate parses them into immutable
//! maps and layers typed lookups on top.
//!
//! # Key types
//!
//! - [`KeyValueMap`] — the parsed, immutable `key=value` table
//! - [`ExternalTexts`] — localized texts with derived-key lookups
//!   (badges, posters, effects, hand items)
//! - [`GameDataError`] — I/O failures while reading a data file

mod error;
mod kv;
mod texts;

pub use error::GameDataError;
pub use kv::{KeyValueMap, LoadWarning};
pub use texts::ExternalTexts;
