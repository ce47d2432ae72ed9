// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::Result;
use crate::model_err;

const DEFAULT_SEED: u64 = 0x6770_6d6c;

/// The identifier of an element inside one `PathwayModel`.  In GPML this is
/// the `elementId` attribute (`GraphId` in the legacy schema).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        ElementId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        ElementId(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        ElementId(id)
    }
}

/// Tracks the identifiers live in one model and hands out fresh ones.
///
/// Generated ids look like `id3f09a1c2`: a fixed prefix (GPML ids are XML
/// NCNames and may not start with a digit) followed by eight hex digits
/// drawn from a seeded RNG, so two models built the same way allocate the
/// same ids.  Ids released by terminated elements may be handed out again.
pub struct IdAllocator {
    live: HashSet<ElementId>,
    rng: StdRng,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            live: HashSet::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce and reserve an id that no live element uses.
    pub fn allocate(&mut self) -> ElementId {
        loop {
            let candidate = ElementId(format!("id{:08x}", self.rng.random::<u32>()));
            if !self.live.contains(&candidate) {
                self.live.insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// True if `id` could be registered: it is non-empty and not live.
    pub fn validate(&self, id: &ElementId) -> bool {
        !id.is_empty() && !self.live.contains(id)
    }

    /// Reserve an externally supplied id, e.g. one read from a file.
    pub fn register(&mut self, id: &ElementId) -> Result<()> {
        if id.is_empty() {
            return model_err!(InvalidReference, "empty element id".to_owned());
        }
        if !self.live.insert(id.clone()) {
            return model_err!(DuplicateIdentifier, id.to_string());
        }
        Ok(())
    }

    pub fn release(&mut self, id: &ElementId) {
        self.live.remove(id);
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live.contains(id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_allocate_is_unique() {
        let mut ids = IdAllocator::new();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let id = ids.allocate();
            assert!(id.as_str().starts_with("id"));
            assert_eq!(10, id.as_str().len());
            assert!(seen.insert(id));
        }
        assert_eq!(1000, ids.len());
    }

    #[test]
    fn test_allocate_is_deterministic_per_seed() {
        let mut a = IdAllocator::with_seed(7);
        let mut b = IdAllocator::with_seed(7);
        for _ in 0..10 {
            assert_eq!(a.allocate(), b.allocate());
        }
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut ids = IdAllocator::new();
        ids.register(&ElementId::from("a1")).unwrap();
        let err = ids.register(&ElementId::from("a1")).unwrap_err();
        assert_eq!(ErrorCode::DuplicateIdentifier, err.code);
        assert_eq!(Some("a1".to_owned()), err.details);
    }

    #[test]
    fn test_validate() {
        let mut ids = IdAllocator::new();
        assert!(!ids.validate(&ElementId::default()));
        assert!(ids.validate(&ElementId::from("a1")));
        ids.register(&ElementId::from("a1")).unwrap();
        assert!(!ids.validate(&ElementId::from("a1")));
        ids.release(&ElementId::from("a1"));
        assert!(ids.validate(&ElementId::from("a1")));
    }

    #[test]
    fn test_allocate_skips_registered() {
        let mut fresh = IdAllocator::new();
        let first = fresh.allocate();

        let mut ids = IdAllocator::new();
        ids.register(&first).unwrap();
        let allocated = ids.allocate();
        assert_ne!(first, allocated);
        assert!(ids.is_live(first.as_str()));
        assert!(ids.is_live(allocated.as_str()));
    }

    proptest::proptest! {
        #[test]
        fn prop_allocated_ids_never_collide_with_registered(
            names in proptest::collection::hash_set("[a-z][a-z0-9]{0,9}", 0..50),
            count in 1usize..50,
        ) {
            let mut ids = IdAllocator::new();
            for name in names.iter() {
                ids.register(&ElementId::from(name.as_str())).unwrap();
            }
            for _ in 0..count {
                let id = ids.allocate();
                proptest::prop_assert!(!names.contains(id.as_str()));
            }
            proptest::prop_assert_eq!(names.len() + count, ids.len());
        }
    }
}
