//! Hash containers and hashers used across Anchorview.
//!
//! The `std-hash` feature swaps the fast hashers for the standard library
//! ones, which is handy when comparing behavior against std containers.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::hash_map::Entry;
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
    pub use std::collections::hash_map::Entry;
}

/// Hasher used for content fingerprints.
#[cfg(feature = "std-hash")]
pub mod hasher {
    pub use std::collections::hash_map::DefaultHasher as FingerprintHasher;

    #[inline]
    pub fn new() -> FingerprintHasher {
        FingerprintHasher::new()
    }
}

/// Hasher used for content fingerprints.
#[cfg(not(feature = "std-hash"))]
pub mod hasher {
    // fixed keys, stable within one process
    pub use ahash::AHasher as FingerprintHasher;

    #[inline]
    pub fn new() -> FingerprintHasher {
        FingerprintHasher::default()
    }
}
