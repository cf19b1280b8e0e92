//! Scoreboard number formats (1.20.3+)

use packetmap_core::{ProtocolError, Result};
use packetmap_protocol::{Compound, TextComponent, WireCursor};
use packetmap_registry::{
    define, define_marker, read_typed, write_typed, Payload, ProtocolRegistry, ProtocolType,
    VersionDiff,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFormat {
    Blank,
    /// Style compound applied to the number
    Styled(Compound),
    /// Text shown instead of the number
    Fixed(TextComponent),
}

impl Payload for ScoreFormat {
    fn empty() -> Self {
        ScoreFormat::Blank
    }

    fn is_empty(&self) -> bool {
        matches!(self, ScoreFormat::Blank)
    }
}

pub type ScoreFormatType = ProtocolType<ScoreFormat>;

fn read_styled(cursor: &mut WireCursor) -> Result<ScoreFormat> {
    Ok(ScoreFormat::Styled(cursor.read_nbt_compound()?.unwrap_or_default()))
}

fn write_styled(cursor: &mut WireCursor, format: &ScoreFormat) -> Result<()> {
    match format {
        ScoreFormat::Styled(style) => cursor.write_nbt(Some(&style.clone().into())),
        other => Err(ProtocolError::InvalidData(format!("Expected a styled format, got {:?}", other))),
    }
}

fn read_fixed(cursor: &mut WireCursor) -> Result<ScoreFormat> {
    Ok(ScoreFormat::Fixed(cursor.read_component()?))
}

fn write_fixed(cursor: &mut WireCursor, format: &ScoreFormat) -> Result<()> {
    match format {
        ScoreFormat::Fixed(text) => cursor.write_component(text),
        other => Err(ProtocolError::InvalidData(format!("Expected a fixed format, got {:?}", other))),
    }
}

/// The `number_format_type` registry
pub struct ScoreFormatTypes {
    registry: ProtocolRegistry<ScoreFormat>,
    pub blank: Arc<ScoreFormatType>,
    pub styled: Arc<ScoreFormatType>,
    pub fixed: Arc<ScoreFormatType>,
}

impl ScoreFormatTypes {
    pub const REGISTRY: &'static str = "number_format_type";

    pub fn declare(diffs: Vec<VersionDiff>) -> Result<Self> {
        let mut registry = ProtocolRegistry::with_mappings(Self::REGISTRY, diffs);
        let blank = define_marker(&mut registry, "blank")?;
        let styled = define(&mut registry, "styled", read_styled, write_styled)?;
        let fixed = define(&mut registry, "fixed", read_fixed, write_fixed)?;
        Ok(Self {
            registry,
            blank,
            styled,
            fixed,
        })
    }

    pub fn registry(&self) -> &ProtocolRegistry<ScoreFormat> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ProtocolRegistry<ScoreFormat> {
        &mut self.registry
    }

    pub fn kind_of(&self, format: &ScoreFormat) -> &Arc<ScoreFormatType> {
        match format {
            ScoreFormat::Blank => &self.blank,
            ScoreFormat::Styled(_) => &self.styled,
            ScoreFormat::Fixed(_) => &self.fixed,
        }
    }

    pub fn read(&self, cursor: &mut WireCursor) -> Result<ScoreFormat> {
        read_typed(&self.registry, cursor).map(|(_, format)| format)
    }

    pub fn write(&self, cursor: &mut WireCursor, format: &ScoreFormat) -> Result<()> {
        write_typed(&self.registry, cursor, self.kind_of(format), format)
    }

    /// Presence flag, then a typed format
    pub fn read_optional(&self, cursor: &mut WireCursor) -> Result<Option<ScoreFormat>> {
        cursor.read_optional(|cursor| self.read(cursor))
    }

    pub fn write_optional(&self, cursor: &mut WireCursor, format: Option<&ScoreFormat>) -> Result<()> {
        cursor.write_optional(format, |cursor, format| self.write(cursor, format))
    }
}
