//! Core type definitions

use serde::{Deserialize, Serialize};
use std::sync::atomic::{self, AtomicU32};

static NEXT_ENTRY_KEY: AtomicU32 = AtomicU32::new(0);

/// Process-unique key of a declared registry entry
///
/// Keys are dense, so sets of entries can be stored as bitsets indexed by key
/// regardless of which registry declared them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey(pub u32);

impl EntryKey {
    pub const fn new(key: u32) -> Self {
        Self(key)
    }

    /// Allocate the next unused key
    pub fn allocate() -> Self {
        Self(NEXT_ENTRY_KEY.fetch_add(1, atomic::Ordering::Relaxed))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for EntryKey {
    fn from(key: u32) -> Self {
        Self(key)
    }
}
