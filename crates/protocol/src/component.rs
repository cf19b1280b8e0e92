//! Chat/text component framing
//!
//! Components travel as a JSON string before 1.20.3 and as an NBT tag from
//! 1.20.3 on. Structured content is carried opaquely in the form the wire
//! uses; only plain text converts between the two.

use crate::cursor::WireCursor;
use crate::nbt::Tag;
use packetmap_core::{ClientVersion, ProtocolError, Result};

/// Longest JSON component accepted on read
pub const MAX_COMPONENT_LENGTH: usize = 262_144;

#[derive(Debug, Clone, PartialEq)]
pub enum TextComponent {
    /// Unstyled text, writable in either era
    Plain(String),
    /// Serialized JSON, pre-1.20.3 only
    Json(String),
    /// NBT tree, 1.20.3 and later only
    Tree(Tag),
}

impl TextComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }
}

fn uses_tree(version: ClientVersion) -> bool {
    version.is_newer_than_or_equals(ClientVersion::V1_20_3)
}

impl WireCursor {
    pub fn read_component(&mut self) -> Result<TextComponent> {
        if uses_tree(self.version()) {
            match self.read_nbt()? {
                Some(Tag::String(text)) => Ok(TextComponent::Plain(text)),
                Some(tag) => Ok(TextComponent::Tree(tag)),
                None => Err(ProtocolError::InvalidData("Missing text component".into())),
            }
        } else {
            let json = self.read_string_bounded(MAX_COMPONENT_LENGTH)?;
            match serde_json::from_str::<String>(&json) {
                Ok(text) => Ok(TextComponent::Plain(text)),
                Err(_) => Ok(TextComponent::Json(json)),
            }
        }
    }

    pub fn write_component(&mut self, component: &TextComponent) -> Result<()> {
        let tree = uses_tree(self.version());
        match component {
            TextComponent::Plain(text) if tree => self.write_nbt(Some(&Tag::String(text.clone()))),
            TextComponent::Plain(text) => {
                let json = serde_json::to_string(text)
                    .map_err(|e| ProtocolError::InvalidData(e.to_string()))?;
                self.write_string_bounded(&json, MAX_COMPONENT_LENGTH)
            }
            TextComponent::Tree(tag) if tree => self.write_nbt(Some(tag)),
            TextComponent::Json(json) if !tree => {
                self.write_string_bounded(json, MAX_COMPONENT_LENGTH)
            }
            _ => Err(ProtocolError::InvalidData(format!(
                "Component form not supported on {}",
                self.version()
            ))),
        }
    }
}
