//! Release channels and the pre-release marker table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::release::error::ConfigError;

/// Minimum stability tier a release must reach to be offered as an update
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLevel {
    Dev,
    Alpha,
    Beta,
    #[default]
    #[serde(alias = "stable")]
    Production,
}

impl ChannelLevel {
    /// Numeric rank shared by marker levels and configured minimums
    pub fn rank(self) -> u8 {
        match self {
            ChannelLevel::Dev => 0,
            ChannelLevel::Alpha => 1,
            ChannelLevel::Beta => 2,
            ChannelLevel::Production => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelLevel::Dev => "dev",
            ChannelLevel::Alpha => "alpha",
            ChannelLevel::Beta => "beta",
            ChannelLevel::Production => "production",
        }
    }
}

impl fmt::Display for ChannelLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(ChannelLevel::Dev),
            "alpha" => Ok(ChannelLevel::Alpha),
            "beta" => Ok(ChannelLevel::Beta),
            "production" | "stable" => Ok(ChannelLevel::Production),
            other => Err(ConfigError::InvalidChannel(other.to_string())),
        }
    }
}

/// Recognized pre-release marker
///
/// Declaration order is the ordering used when two versions share a numeric
/// core and both carry a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    Dev,
    Alpha,
    Beta,
    Rc,
    Patch,
}

impl Marker {
    /// Look up a marker token; `None` for tokens outside the table
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "dev" => Some(Marker::Dev),
            "alpha" | "a" => Some(Marker::Alpha),
            "beta" | "b" => Some(Marker::Beta),
            "rc" => Some(Marker::Rc),
            "p" => Some(Marker::Patch),
            _ => None,
        }
    }

    pub fn level(self) -> ChannelLevel {
        match self {
            Marker::Dev => ChannelLevel::Dev,
            Marker::Alpha => ChannelLevel::Alpha,
            Marker::Beta => ChannelLevel::Beta,
            Marker::Rc | Marker::Patch => ChannelLevel::Production,
        }
    }
}

/// Whether a release carrying `marker` may be offered under `minimum`
///
/// Releases without a marker, or with a marker outside the table, always pass.
pub fn is_acceptable(marker: Option<&str>, minimum: ChannelLevel) -> bool {
    match marker.and_then(Marker::from_token) {
        Some(marker) => marker.level().rank() >= minimum.rank(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dev", ChannelLevel::Dev, true)]
    #[case("dev", ChannelLevel::Alpha, false)]
    #[case("dev", ChannelLevel::Beta, false)]
    #[case("dev", ChannelLevel::Production, false)]
    #[case("alpha", ChannelLevel::Dev, true)]
    #[case("alpha", ChannelLevel::Alpha, true)]
    #[case("alpha", ChannelLevel::Beta, false)]
    #[case("alpha", ChannelLevel::Production, false)]
    #[case("beta", ChannelLevel::Dev, true)]
    #[case("beta", ChannelLevel::Alpha, true)]
    #[case("beta", ChannelLevel::Beta, true)]
    #[case("beta", ChannelLevel::Production, false)]
    #[case("rc", ChannelLevel::Dev, true)]
    #[case("rc", ChannelLevel::Alpha, true)]
    #[case("rc", ChannelLevel::Beta, true)]
    #[case("rc", ChannelLevel::Production, true)]
    fn is_acceptable_compares_marker_level_with_minimum(
        #[case] marker: &str,
        #[case] minimum: ChannelLevel,
        #[case] expected: bool,
    ) {
        assert_eq!(is_acceptable(Some(marker), minimum), expected);
    }

    #[rstest]
    #[case("a", ChannelLevel::Alpha)]
    #[case("b", ChannelLevel::Beta)]
    #[case("p", ChannelLevel::Production)]
    fn short_aliases_map_to_same_level(#[case] token: &str, #[case] level: ChannelLevel) {
        assert_eq!(Marker::from_token(token).map(Marker::level), Some(level));
    }

    #[rstest]
    #[case(ChannelLevel::Dev)]
    #[case(ChannelLevel::Production)]
    fn missing_or_unknown_marker_is_always_acceptable(#[case] minimum: ChannelLevel) {
        assert!(is_acceptable(None, minimum));
        assert!(is_acceptable(Some("nightly"), minimum));
    }

    #[test]
    fn channel_ranks_are_strictly_increasing() {
        let ranks: Vec<u8> = [
            ChannelLevel::Dev,
            ChannelLevel::Alpha,
            ChannelLevel::Beta,
            ChannelLevel::Production,
        ]
        .into_iter()
        .map(ChannelLevel::rank)
        .collect();

        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[rstest]
    #[case("Beta", Some(ChannelLevel::Beta))]
    #[case(" stable ", Some(ChannelLevel::Production))]
    #[case("nightly", None)]
    fn from_str_parses_config_values(#[case] input: &str, #[case] expected: Option<ChannelLevel>) {
        assert_eq!(input.parse::<ChannelLevel>().ok(), expected);
    }
}
