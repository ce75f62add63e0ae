use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide identity counter shared by entities and components.
///
/// Relaxed ordering is enough: only uniqueness and monotonicity per call
/// site are required, never ordering against other memory.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_unique_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Unique identifier for every entity. Assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Draw a fresh ID from the process-wide counter.
    pub fn next() -> Self {
        Self(next_unique_id())
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for every component instance. Assigned at construction
/// and again for every clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Draw a fresh ID from the process-wide counter.
    pub fn next() -> Self {
        Self(next_unique_id())
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn entity_and_component_ids_share_one_sequence() {
        let e = EntityId::next();
        let c = ComponentId::next();
        assert_ne!(e.get(), c.get());
    }

    #[test]
    fn display_forms() {
        let e = EntityId(7);
        let c = ComponentId(9);
        assert_eq!(e.to_string(), "#7");
        assert_eq!(c.to_string(), "c9");
    }
}
