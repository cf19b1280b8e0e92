//! Namespaced identifiers (`namespace:key`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace used when a textual identifier carries none
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Stable, version-independent name of a protocol concept
///
/// # Parsing
/// - `"stone"` → `minecraft:stone`
/// - `":stone"` → `minecraft:stone` (a leading delimiter means no namespace)
/// - `"brigadier:bool"` → namespace `brigadier`, key `bool`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Identifier {
    namespace: String,
    key: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Identifier in the default namespace
    pub fn minecraft(key: impl Into<String>) -> Self {
        Self::new(DEFAULT_NAMESPACE, key)
    }

    pub fn parse(location: &str) -> Self {
        match location.find(':') {
            Some(0) => Self::minecraft(&location[1..]),
            Some(index) => Self::new(&location[..index], &location[index + 1..]),
            None => Self::minecraft(location),
        }
    }

    /// Qualify a textual identifier with the default namespace if it has none
    pub fn normalize(location: &str) -> String {
        match location.find(':') {
            Some(0) => format!("{}{}", DEFAULT_NAMESPACE, location),
            Some(_) => location.to_string(),
            None => format!("{}:{}", DEFAULT_NAMESPACE, location),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_default_namespace(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Identifier {
    fn from(location: &str) -> Self {
        Self::parse(location)
    }
}

impl From<String> for Identifier {
    fn from(location: String) -> Self {
        Self::parse(&location)
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_without_namespace() {
        let id = Identifier::parse("stone");
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.key(), "stone");
    }

    #[test]
    fn test_parse_with_namespace() {
        let id = Identifier::parse("brigadier:bool");
        assert_eq!(id.namespace(), "brigadier");
        assert_eq!(id.key(), "bool");
        assert_eq!(id.to_string(), "brigadier:bool");
    }

    #[test]
    fn test_leading_colon_uses_default_namespace() {
        assert_eq!(Identifier::parse(":dirt"), Identifier::minecraft("dirt"));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Identifier::from("minecraft:block"), Identifier::from("block"));
        assert_ne!(Identifier::from("a:block"), Identifier::from("block"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Identifier::normalize("stone"), "minecraft:stone");
        assert_eq!(Identifier::normalize(":stone"), "minecraft:stone");
        assert_eq!(Identifier::normalize("mod:stone"), "mod:stone");
    }

    #[test]
    fn test_serde_uses_text_form() {
        let id = Identifier::new("brigadier", "float");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"brigadier:float\"");
        let back: Identifier = serde_json::from_str("\"dust\"").unwrap();
        assert_eq!(back, Identifier::minecraft("dust"));
    }

    proptest! {
        #[test]
        fn text_form_parses_back(namespace in "[a-z0-9_.-]{1,16}", key in "[a-z0-9_./-]{1,32}") {
            let id = Identifier::new(namespace, key);
            prop_assert_eq!(Identifier::parse(&id.to_string()), id);
        }
    }
}
