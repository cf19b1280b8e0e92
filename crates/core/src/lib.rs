//! packetmap core - identifiers, protocol versions, positions and errors

mod error;
mod identifier;
mod positions;
mod types;
mod version;

pub use error::*;
pub use identifier::*;
pub use positions::*;
pub use types::*;
pub use version::*;
