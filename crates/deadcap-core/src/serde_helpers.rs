//! Field-level deserializers for loosely typed CSV cells

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer};

/// Deserialize an optional value from a text cell.
///
/// Blank cells and values that do not parse as `T` both become `None`, so one
/// odd tag never fails the whole table load.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let cell: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        trimmed.into_deserializer();
    Ok(T::deserialize(cell).ok())
}
