//! Component kind registration, dense ids, and signatures.
//!
//! Every component kind used in the ECS gets a dense integer id from a
//! [`ComponentRegistry`], assigned monotonically from 0. Kinds can be
//! registered by Rust type (via the [`Component`] trait) or by string name;
//! both keys share a single id space and repeated lookups for the same key
//! always return the same id.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Component trait
// ---------------------------------------------------------------------------

/// Marker trait for types storable in component pools.
///
/// `NAME` is the stable string identity used by the name-keyed half of the
/// registry; registering a type also binds its name to the same id.
pub trait Component: Send + Sync + 'static {
    /// Stable human-readable name of this component kind.
    const NAME: &'static str;
}

// ---------------------------------------------------------------------------
// ComponentId
// ---------------------------------------------------------------------------

/// Upper bound on distinct component kinds; signature bits index below it.
pub const MAX_COMPONENTS: usize = 128;

/// Dense identifier for a registered component kind, in `[0, MAX_COMPONENTS)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Sentinel meaning "no component kind".
    pub const INVALID: ComponentId = ComponentId(u32::MAX);

    /// Index form for pool and signature addressing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 128-bit bitset over component-kind ids.
///
/// Systems describe their required component kinds as a signature; the
/// registry keeps a signature of all non-empty pools and activates a system
/// only when its requirement is a subset of what is available.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Signature([u64; 2]);

impl Signature {
    /// The empty signature.
    pub const fn empty() -> Self {
        Signature([0; 2])
    }

    /// Set the bit for `id`. Out-of-range ids are rejected: panic in debug
    /// builds, logged and ignored in release.
    pub fn set(&mut self, id: ComponentId) {
        let k = id.index();
        if k >= MAX_COMPONENTS {
            debug_assert!(false, "component id {k} out of signature range");
            tracing::error!(id = k, "component id out of signature range, bit dropped");
            return;
        }
        self.0[k / 64] |= 1 << (k % 64);
    }

    /// Clear the bit for `id`.
    pub fn clear(&mut self, id: ComponentId) {
        let k = id.index();
        if k >= MAX_COMPONENTS {
            return;
        }
        self.0[k / 64] &= !(1 << (k % 64));
    }

    /// Whether the bit for `id` is set.
    pub fn test(&self, id: ComponentId) -> bool {
        let k = id.index();
        k < MAX_COMPONENTS && self.0[k / 64] & (1 << (k % 64)) != 0
    }

    /// Whether every bit of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Signature) -> bool {
        self.0[0] & other.0[0] == self.0[0] && self.0[1] & other.0[1] == self.0[1]
    }

    /// Number of set bits.
    pub fn count(&self) -> u32 {
        self.0[0].count_ones() + self.0[1].count_ones()
    }

    /// Chainable registration helper for building requirement signatures.
    pub fn with<T: Component>(mut self, components: &mut ComponentRegistry) -> Self {
        self.set(components.id_of::<T>());
        self
    }

    /// Reset every bit.
    pub fn reset(&mut self) {
        self.0 = [0; 2];
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#018x}{:016x})", self.0[1], self.0[0])
    }
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Maps component kinds to dense ids, keyed by Rust type and by name.
///
/// Both key spaces are injective and share one id sequence: registering a
/// type binds its `NAME` as well, and `id_of_name` for an already-bound name
/// returns the existing id. Per-type lookups are amortised O(1) through the
/// `TypeId` map.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentId>,
    by_name: HashMap<String, ComponentId>,
    /// Indexed by `ComponentId`; holds the registered name.
    names: Vec<String>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of component kind `T`, registering it on first use.
    ///
    /// Always succeeds. If `T::NAME` was previously registered by name only,
    /// the type is bound to that existing id so both keys stay in agreement.
    pub fn id_of<T: Component>(&mut self) -> ComponentId {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.by_type.get(&type_id) {
            return id;
        }
        let id = if let Some(&existing) = self.by_name.get(T::NAME) {
            existing
        } else {
            self.allocate(T::NAME)
        };
        self.by_type.insert(type_id, id);
        id
    }

    /// Id of the kind registered under `name`, registering it on first use.
    pub fn id_of_name(&mut self, name: &str) -> ComponentId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        self.allocate(name)
    }

    /// Name of a registered kind, or `None` for an unknown id.
    pub fn name_of(&self, id: ComponentId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Id previously registered under `name`, without registering.
    pub fn id_for_name(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Id of `T` if it has been registered, without registering.
    pub fn lookup<T: Component>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no kinds are registered yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn allocate(&mut self, name: &str) -> ComponentId {
        assert!(
            self.names.len() < MAX_COMPONENTS,
            "component kind limit ({MAX_COMPONENTS}) exceeded registering '{name}'"
        );
        let id = ComponentId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.by_name.insert(name.to_owned(), id);
        id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Pos;
    impl Component for Pos {
        const NAME: &'static str = "pos";
    }

    struct Vel;
    impl Component for Vel {
        const NAME: &'static str = "vel";
    }

    #[test]
    fn ids_are_dense_from_zero() {
        let mut reg = ComponentRegistry::new();
        assert_eq!(reg.id_of::<Pos>().index(), 0);
        assert_eq!(reg.id_of::<Vel>().index(), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn repeated_lookup_returns_same_id() {
        let mut reg = ComponentRegistry::new();
        let a = reg.id_of::<Pos>();
        let b = reg.id_of::<Pos>();
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn type_and_name_share_one_id_space() {
        let mut reg = ComponentRegistry::new();
        let by_type = reg.id_of::<Pos>();
        assert_eq!(reg.id_of_name("pos"), by_type);
        assert_eq!(reg.id_for_name("pos"), Some(by_type));
        assert_eq!(reg.name_of(by_type), Some("pos"));
    }

    #[test]
    fn name_first_then_type_binds_to_same_id() {
        let mut reg = ComponentRegistry::new();
        let by_name = reg.id_of_name("vel");
        let by_type = reg.id_of::<Vel>();
        assert_eq!(by_name, by_type);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn name_of_unknown_id_is_none() {
        let reg = ComponentRegistry::new();
        assert_eq!(reg.name_of(ComponentId(7)), None);
        assert_eq!(reg.id_for_name("nope"), None);
    }

    #[test]
    fn signature_set_test_clear() {
        let mut sig = Signature::empty();
        let id = ComponentId(70);
        assert!(!sig.test(id));
        sig.set(id);
        assert!(sig.test(id));
        assert_eq!(sig.count(), 1);
        sig.clear(id);
        assert!(!sig.test(id));
    }

    #[test]
    fn signature_subset() {
        let mut small = Signature::empty();
        let mut big = Signature::empty();
        small.set(ComponentId(3));
        big.set(ComponentId(3));
        big.set(ComponentId(90));
        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert!(Signature::empty().is_subset_of(&small));
    }
}
