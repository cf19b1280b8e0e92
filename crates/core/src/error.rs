//! Core error types for packetmap

use crate::ClientVersion;

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("Duplicate identifier {identifier} in registry {registry}")]
    DuplicateIdentifier { registry: String, identifier: String },

    #[error("Unknown identifier {identifier} in registry {registry}")]
    UnknownIdentifier { registry: String, identifier: String },

    #[error("Unknown id {id} in registry {registry} for version {version}")]
    UnknownId {
        registry: String,
        version: ClientVersion,
        id: i32,
    },

    #[error("Mapping load error: {0}")]
    MappingLoad(String),

    #[error("VarInt longer than {max_bytes} bytes")]
    VarIntTooLong { max_bytes: usize },

    #[error("String of length {length} exceeds limit of {max}")]
    StringTooLong { length: usize, max: usize },

    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("Collection of size {length} exceeds limit of {max}")]
    CollectionTooLarge { length: usize, max: usize },

    #[error("Unsupported payload: {0}")]
    UnsupportedPayload(String),

    #[error("Position component {axis}={value} out of range")]
    PositionOutOfRange { axis: char, value: i32 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} has not been initialized")]
    Uninitialized(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
