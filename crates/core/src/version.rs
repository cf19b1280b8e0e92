//! Protocol release ordering
//!
//! Every version-sensitive decision is expressed as "is this version at least
//! some threshold". Variants are declared oldest first, so the derived `Ord`
//! is the chronological order of releases.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client protocol release
///
/// Releases that share a protocol number (e.g. 1.16.4 and 1.16.5) are one variant.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClientVersion {
    V1_7_10,
    V1_8,
    V1_9,
    V1_9_2,
    V1_9_4,
    V1_10,
    V1_11,
    V1_11_1,
    V1_12,
    V1_12_1,
    V1_12_2,
    V1_13,
    V1_13_1,
    V1_13_2,
    V1_14,
    V1_14_1,
    V1_14_2,
    V1_14_3,
    V1_14_4,
    V1_15,
    V1_15_1,
    V1_15_2,
    V1_16,
    V1_16_1,
    V1_16_2,
    V1_16_3,
    V1_16_4,
    V1_17,
    V1_17_1,
    V1_18,
    V1_18_2,
    V1_19,
    V1_19_1,
    V1_19_3,
    V1_19_4,
    V1_20,
    V1_20_2,
    V1_20_3,
    V1_20_5,
    V1_21,
    V1_21_2,
    V1_21_4,
}

impl ClientVersion {
    /// All releases, oldest first
    pub const ALL: [ClientVersion; 42] = [
        Self::V1_7_10,
        Self::V1_8,
        Self::V1_9,
        Self::V1_9_2,
        Self::V1_9_4,
        Self::V1_10,
        Self::V1_11,
        Self::V1_11_1,
        Self::V1_12,
        Self::V1_12_1,
        Self::V1_12_2,
        Self::V1_13,
        Self::V1_13_1,
        Self::V1_13_2,
        Self::V1_14,
        Self::V1_14_1,
        Self::V1_14_2,
        Self::V1_14_3,
        Self::V1_14_4,
        Self::V1_15,
        Self::V1_15_1,
        Self::V1_15_2,
        Self::V1_16,
        Self::V1_16_1,
        Self::V1_16_2,
        Self::V1_16_3,
        Self::V1_16_4,
        Self::V1_17,
        Self::V1_17_1,
        Self::V1_18,
        Self::V1_18_2,
        Self::V1_19,
        Self::V1_19_1,
        Self::V1_19_3,
        Self::V1_19_4,
        Self::V1_20,
        Self::V1_20_2,
        Self::V1_20_3,
        Self::V1_20_5,
        Self::V1_21,
        Self::V1_21_2,
        Self::V1_21_4,
    ];

    pub const fn oldest() -> Self {
        Self::V1_7_10
    }

    pub const fn latest() -> Self {
        Self::V1_21_4
    }

    /// Position of this release in [`ClientVersion::ALL`]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub const fn protocol_version(self) -> i32 {
        match self {
            Self::V1_7_10 => 5,
            Self::V1_8 => 47,
            Self::V1_9 => 107,
            Self::V1_9_2 => 109,
            Self::V1_9_4 => 110,
            Self::V1_10 => 210,
            Self::V1_11 => 315,
            Self::V1_11_1 => 316,
            Self::V1_12 => 335,
            Self::V1_12_1 => 338,
            Self::V1_12_2 => 340,
            Self::V1_13 => 393,
            Self::V1_13_1 => 401,
            Self::V1_13_2 => 404,
            Self::V1_14 => 477,
            Self::V1_14_1 => 480,
            Self::V1_14_2 => 485,
            Self::V1_14_3 => 490,
            Self::V1_14_4 => 498,
            Self::V1_15 => 573,
            Self::V1_15_1 => 575,
            Self::V1_15_2 => 578,
            Self::V1_16 => 735,
            Self::V1_16_1 => 736,
            Self::V1_16_2 => 751,
            Self::V1_16_3 => 753,
            Self::V1_16_4 => 754,
            Self::V1_17 => 755,
            Self::V1_17_1 => 756,
            Self::V1_18 => 757,
            Self::V1_18_2 => 758,
            Self::V1_19 => 759,
            Self::V1_19_1 => 760,
            Self::V1_19_3 => 761,
            Self::V1_19_4 => 762,
            Self::V1_20 => 763,
            Self::V1_20_2 => 764,
            Self::V1_20_3 => 765,
            Self::V1_20_5 => 766,
            Self::V1_21 => 767,
            Self::V1_21_2 => 768,
            Self::V1_21_4 => 769,
        }
    }

    pub const fn release_name(self) -> &'static str {
        match self {
            Self::V1_7_10 => "1.7.10",
            Self::V1_8 => "1.8",
            Self::V1_9 => "1.9",
            Self::V1_9_2 => "1.9.2",
            Self::V1_9_4 => "1.9.4",
            Self::V1_10 => "1.10",
            Self::V1_11 => "1.11",
            Self::V1_11_1 => "1.11.1",
            Self::V1_12 => "1.12",
            Self::V1_12_1 => "1.12.1",
            Self::V1_12_2 => "1.12.2",
            Self::V1_13 => "1.13",
            Self::V1_13_1 => "1.13.1",
            Self::V1_13_2 => "1.13.2",
            Self::V1_14 => "1.14",
            Self::V1_14_1 => "1.14.1",
            Self::V1_14_2 => "1.14.2",
            Self::V1_14_3 => "1.14.3",
            Self::V1_14_4 => "1.14.4",
            Self::V1_15 => "1.15",
            Self::V1_15_1 => "1.15.1",
            Self::V1_15_2 => "1.15.2",
            Self::V1_16 => "1.16",
            Self::V1_16_1 => "1.16.1",
            Self::V1_16_2 => "1.16.2",
            Self::V1_16_3 => "1.16.3",
            Self::V1_16_4 => "1.16.4",
            Self::V1_17 => "1.17",
            Self::V1_17_1 => "1.17.1",
            Self::V1_18 => "1.18",
            Self::V1_18_2 => "1.18.2",
            Self::V1_19 => "1.19",
            Self::V1_19_1 => "1.19.1",
            Self::V1_19_3 => "1.19.3",
            Self::V1_19_4 => "1.19.4",
            Self::V1_20 => "1.20",
            Self::V1_20_2 => "1.20.2",
            Self::V1_20_3 => "1.20.3",
            Self::V1_20_5 => "1.20.5",
            Self::V1_21 => "1.21",
            Self::V1_21_2 => "1.21.2",
            Self::V1_21_4 => "1.21.4",
        }
    }

    pub fn from_protocol_version(protocol: i32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|version| version.protocol_version() == protocol)
    }

    /// Resolve a release name, including releases that reuse another's protocol
    fn from_release_name(name: &str) -> Option<Self> {
        let canonical = match name {
            "1.8.9" => "1.8",
            "1.9.1" => "1.9",
            "1.9.3" => "1.9.4",
            "1.10.1" | "1.10.2" => "1.10",
            "1.11.2" => "1.11.1",
            "1.16.5" => "1.16.4",
            "1.18.1" => "1.18",
            "1.19.2" => "1.19.1",
            "1.20.1" => "1.20",
            "1.20.4" => "1.20.3",
            "1.20.6" => "1.20.5",
            "1.21.1" => "1.21",
            "1.21.3" => "1.21.2",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|version| version.release_name() == canonical)
    }

    pub fn is_newer_than(self, other: Self) -> bool {
        self > other
    }

    pub fn is_newer_than_or_equals(self, other: Self) -> bool {
        self >= other
    }

    pub fn is_older_than(self, other: Self) -> bool {
        self < other
    }

    pub fn is_older_than_or_equals(self, other: Self) -> bool {
        self <= other
    }

    /// Inclusive on both ends
    pub fn is_between(self, oldest: Self, newest: Self) -> bool {
        self >= oldest && self <= newest
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release_name())
    }
}

impl FromStr for ClientVersion {
    type Err = ProtocolError;

    /// Accepts `1.20.5`, `V_1_20_5` and `v1_20_5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let stripped = trimmed
            .strip_prefix("V_")
            .or_else(|| trimmed.strip_prefix('V'))
            .or_else(|| trimmed.strip_prefix('v'))
            .unwrap_or(trimmed);
        let name = stripped.replace('_', ".");
        Self::from_release_name(&name)
            .ok_or_else(|| ProtocolError::InvalidData(format!("Unknown client version: {}", s)))
    }
}

impl TryFrom<String> for ClientVersion {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClientVersion> for String {
    fn from(version: ClientVersion) -> Self {
        version.release_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (index, version) in ClientVersion::ALL.iter().enumerate() {
            assert_eq!(version.ordinal(), index);
        }
        assert_eq!(ClientVersion::ALL[0], ClientVersion::oldest());
        assert_eq!(ClientVersion::ALL[ClientVersion::ALL.len() - 1], ClientVersion::latest());
    }

    #[test]
    fn test_protocol_numbers_increase() {
        for pair in ClientVersion::ALL.windows(2) {
            assert!(pair[0].protocol_version() < pair[1].protocol_version());
        }
    }

    #[test]
    fn test_comparisons() {
        let v = ClientVersion::V1_14;
        assert!(v.is_newer_than(ClientVersion::V1_13_2));
        assert!(v.is_newer_than_or_equals(ClientVersion::V1_14));
        assert!(v.is_older_than(ClientVersion::V1_14_1));
        assert!(v.is_older_than_or_equals(ClientVersion::V1_14));
        assert!(v.is_between(ClientVersion::V1_13, ClientVersion::V1_14));
        assert!(!v.is_between(ClientVersion::V1_14_1, ClientVersion::latest()));
    }

    #[test]
    fn test_parse_release_names() {
        assert_eq!("1.20.5".parse::<ClientVersion>().unwrap(), ClientVersion::V1_20_5);
        assert_eq!("V_1_20_5".parse::<ClientVersion>().unwrap(), ClientVersion::V1_20_5);
        assert_eq!("v1_8".parse::<ClientVersion>().unwrap(), ClientVersion::V1_8);
        assert_eq!("1.16.5".parse::<ClientVersion>().unwrap(), ClientVersion::V1_16_4);
        assert!("1.99".parse::<ClientVersion>().is_err());
    }

    #[test]
    fn test_from_protocol_version() {
        assert_eq!(ClientVersion::from_protocol_version(47), Some(ClientVersion::V1_8));
        assert_eq!(ClientVersion::from_protocol_version(769), Some(ClientVersion::V1_21_4));
        assert_eq!(ClientVersion::from_protocol_version(1), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&ClientVersion::V1_19_4).unwrap();
        assert_eq!(json, "\"1.19.4\"");
        let back: ClientVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClientVersion::V1_19_4);
    }
}
