//! Serde support for nullable columns in partial-update DTOs.
//!
//! A nullable field is modelled as `Option<Option<T>>`:
//!
//! - key absent: `None` (leave the column alone)
//! - `"key": null`: `Some(None)` (clear the column)
//! - `"key": value`: `Some(Some(value))`
//!
//! Use with `#[serde(default, deserialize_with = "patch::nullable")]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present key, keeping an explicit `null` distinct from a
/// missing one. `#[serde(default)]` supplies the missing case.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
