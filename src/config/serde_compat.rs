//! Serde helpers that keep `config.json` readable by older deployments.
//!
//! Snowflakes are stored as decimal strings with `""` meaning unset, and
//! durations are stored as integer nanoseconds.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::num::NonZeroU64;
use std::time::Duration;

/// `Option<Id>` <-> `"123"` / `""`
pub mod optional_id {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Copy + Into<u64>,
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_str(&(*id).into().to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: From<NonZeroU64>,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
            Null(()),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<u64>()
                    .map_err(|_| de::Error::custom(format!("invalid snowflake '{}'", text)))?
            }
            Raw::Number(n) => n,
            Raw::Null(()) => return Ok(None),
        };

        Ok(NonZeroU64::new(raw).map(T::from))
    }
}

/// `Duration` <-> integer nanoseconds
pub mod duration_nanos {
    use super::*;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Read back as i64, so saturate there
        let nanos = i64::try_from(value.as_nanos()).unwrap_or(i64::MAX);
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Negative values were never meaningful, clamp them to zero
        let nanos = i64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
