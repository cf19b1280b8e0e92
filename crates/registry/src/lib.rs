//! packetmap registry - versioned name/ID resolution and codec binding
//!
//! A registry holds the named concepts of one family (particle types, entity
//! types, ...). Each is declared once; its wire ID per version comes from
//! diff records replayed at load time, or from declaration order where the
//! protocol never had explicit IDs.

mod binding;
mod bundle;
mod entry;
mod keyset;
mod registry;
mod replay;

pub use binding::*;
pub use bundle::*;
pub use entry::*;
pub use keyset::*;
pub use registry::*;
pub use replay::replay;
