//! Likelihood levels reported by face detection.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Ordinal confidence bucket, serialized by name (`"VERY_LIKELY"`).
///
/// Deserializes from the name or from the service's numeric enum value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    /// All levels in ordinal order.
    pub const ALL: [Likelihood; 6] = [
        Likelihood::Unknown,
        Likelihood::VeryUnlikely,
        Likelihood::Unlikely,
        Likelihood::Possible,
        Likelihood::Likely,
        Likelihood::VeryLikely,
    ];

    /// Map the service's numeric enum value. Unrecognized values are `Unknown`.
    pub fn from_ordinal(value: i64) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Likelihood::Unknown => "UNKNOWN",
            Likelihood::VeryUnlikely => "VERY_UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY_LIKELY",
        }
    }

    /// LIKELY or VERY_LIKELY.
    pub fn is_likely(&self) -> bool {
        matches!(self, Likelihood::Likely | Likelihood::VeryLikely)
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Likelihood {
    type Err = LikelihoodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| LikelihoodParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown likelihood: {0}")]
pub struct LikelihoodParseError(String);

impl<'de> Deserialize<'de> for Likelihood {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LikelihoodVisitor;

        impl Visitor<'_> for LikelihoodVisitor {
            type Value = Likelihood;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a likelihood name or ordinal")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Likelihood, E> {
                value.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Likelihood, E> {
                Ok(Likelihood::from_ordinal(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Likelihood, E> {
                Ok(i64::try_from(value).map(Likelihood::from_ordinal).unwrap_or_default())
            }
        }

        deserializer.deserialize_any(LikelihoodVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_by_name() {
        let json = serde_json::to_string(&Likelihood::VeryLikely).unwrap();
        assert_eq!(json, "\"VERY_LIKELY\"");

        let parsed: Likelihood = serde_json::from_str("\"VERY_UNLIKELY\"").unwrap();
        assert_eq!(parsed, Likelihood::VeryUnlikely);
    }

    #[test]
    fn test_from_ordinal() {
        assert_eq!(Likelihood::from_ordinal(0), Likelihood::Unknown);
        assert_eq!(Likelihood::from_ordinal(4), Likelihood::Likely);
        assert_eq!(Likelihood::from_ordinal(5), Likelihood::VeryLikely);
        assert_eq!(Likelihood::from_ordinal(6), Likelihood::Unknown);
        assert_eq!(Likelihood::from_ordinal(-1), Likelihood::Unknown);
    }

    #[test]
    fn test_deserializes_from_ordinal() {
        let parsed: Vec<Likelihood> = serde_json::from_str("[0, 4, 5, 9, -2]").unwrap();
        assert_eq!(
            parsed,
            vec![
                Likelihood::Unknown,
                Likelihood::Likely,
                Likelihood::VeryLikely,
                Likelihood::Unknown,
                Likelihood::Unknown,
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_name() {
        assert!(serde_json::from_str::<Likelihood>("\"MAYBE\"").is_err());
        assert!(serde_json::from_str::<Likelihood>("true").is_err());
        assert!("likely".parse::<Likelihood>().is_err());
        assert_eq!("LIKELY".parse::<Likelihood>().unwrap(), Likelihood::Likely);
    }

    #[test]
    fn test_display_matches_serde_name() {
        for level in Likelihood::ALL {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json.trim_matches('"'), level.to_string());
        }
    }

    #[test]
    fn test_is_likely() {
        let likely: Vec<_> = Likelihood::ALL.into_iter().filter(Likelihood::is_likely).collect();
        assert_eq!(likely, vec![Likelihood::Likely, Likelihood::VeryLikely]);
    }
}
