//! The registry: entities, component pools, systems, and the clock.
//!
//! [`Registry`] is the single owner of all simulation state. It stores one
//! [`SparseSet`] per live component kind, a signature of which pools are
//! non-empty, and the registered systems. [`Registry::update`] advances the
//! fixed-step clock and runs every enabled system whose requirement
//! signature is currently satisfied, in ascending priority order.
//!
//! # Joins and structural mutation
//!
//! The `each1`..`each6` methods iterate every entity present in all of the
//! named pools, pivoting on the smallest pool. The pivot's dense entity
//! array is snapshotted before iteration and every entity is re-checked
//! against all joined pools, so the pass is insensitive to what callers
//! queue up for afterwards. Creating or destroying entities *during* a join
//! is not expressible (the join holds the pools mutably); systems collect
//! kill/spawn lists inside the join and flush them once it returns.

use crate::clock::GameClock;
use crate::component::{Component, ComponentId, ComponentRegistry, Signature};
use crate::entity::{Entity, EntityManager};
use crate::sparse::SparseSet;
use crate::system::{System, SystemEntry};
use crate::EcsError;

use std::any::Any;

// ---------------------------------------------------------------------------
// Type-erased pool
// ---------------------------------------------------------------------------

/// Object-safe surface of a [`SparseSet`], for kind-agnostic operations.
trait ComponentPool: Send {
    fn remove_entity(&mut self, e: Entity) -> bool;
    fn len(&self) -> usize;
    fn contains(&self, e: Entity) -> bool;
    fn entities(&self) -> &[Entity];
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentPool for SparseSet<T> {
    fn remove_entity(&mut self, e: Entity) -> bool {
        self.remove(e).is_some()
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn contains(&self, e: Entity) -> bool {
        SparseSet::contains(self, e)
    }

    fn entities(&self) -> &[Entity] {
        SparseSet::entities(self)
    }

    fn clear(&mut self) {
        SparseSet::clear(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owner of entities, component pools, systems, and the simulation clock.
pub struct Registry {
    entities: EntityManager,
    components: ComponentRegistry,
    /// Indexed by [`ComponentId`]; `None` until a kind's first emplace.
    pools: Vec<Option<Box<dyn ComponentPool>>>,
    /// Bit `k` set iff pool `k` exists and is non-empty.
    available: Signature,
    systems: Vec<SystemEntry>,
    clock: GameClock,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with a default 60 Hz clock.
    pub fn new() -> Self {
        Self {
            entities: EntityManager::new(),
            components: ComponentRegistry::new(),
            pools: Vec::new(),
            available: Signature::empty(),
            systems: Vec::new(),
            clock: GameClock::default(),
        }
    }

    // -- entities -----------------------------------------------------------

    /// Create a new entity.
    pub fn create(&mut self) -> Entity {
        self.entities.create()
    }

    /// Destroy `e`, removing it from every pool before recycling the id.
    pub fn destroy(&mut self, e: Entity) -> Result<(), EcsError> {
        if !self.entities.is_alive(e) {
            return Err(EcsError::DeadEntity { entity: e });
        }
        let mut emptied = false;
        for (k, slot) in self.pools.iter_mut().enumerate() {
            if let Some(pool) = slot {
                if pool.remove_entity(e) && pool.len() == 0 {
                    self.available.clear(ComponentId(k as u32));
                    emptied = true;
                }
            }
        }
        if emptied {
            self.refresh_system_activity();
        }
        self.entities.destroy(e);
        Ok(())
    }

    /// Whether `e` is currently alive.
    pub fn is_alive(&self, e: Entity) -> bool {
        self.entities.is_alive(e)
    }

    /// Number of alive entities.
    pub fn alive(&self) -> usize {
        self.entities.alive()
    }

    /// Drop every entity and component; registered systems survive.
    pub fn clear(&mut self) {
        self.pools.clear();
        self.entities.clear();
        self.available.reset();
        self.refresh_system_activity();
    }

    // -- components ---------------------------------------------------------

    /// Attach (or overwrite) a `T` on `e`, returning a reference to it.
    ///
    /// The first component of a kind makes that pool available and may
    /// activate systems requiring it.
    pub fn emplace<T: Component>(&mut self, e: Entity, value: T) -> &mut T {
        debug_assert!(self.entities.is_alive(e), "emplace on dead entity {e:?}");
        let id = self.components.id_of::<T>();
        let k = id.index();
        if k >= self.pools.len() {
            self.pools.resize_with(k + 1, || None);
        }
        let pool = self.pools[k]
            .get_or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("component pool type mismatch");
        let was_empty = pool.is_empty();
        pool.insert(e, value);
        if was_empty {
            self.available.set(id);
            self.refresh_system_activity();
        }
        // Re-borrow for the return value; the pool is known to exist now.
        self.pools[k]
            .as_mut()
            .and_then(|p| p.as_any_mut().downcast_mut::<SparseSet<T>>())
            .and_then(|p| p.get_mut(e))
            .expect("value emplaced above")
    }

    /// Detach a `T` from `e`, returning the removed value.
    ///
    /// Removing the last component of a kind makes that pool unavailable
    /// and may deactivate systems.
    pub fn remove<T: Component>(&mut self, e: Entity) -> Option<T> {
        let id = self.components.lookup::<T>()?;
        let pool = self.typed_pool_mut::<T>(id)?;
        let removed = pool.remove(e);
        if removed.is_some() && pool.is_empty() {
            self.available.clear(id);
            self.refresh_system_activity();
        }
        removed
    }

    /// Whether `e` carries a `T`.
    pub fn has<T: Component>(&self, e: Entity) -> bool {
        self.components
            .lookup::<T>()
            .and_then(|id| self.pool_slot(id))
            .is_some_and(|p| p.contains(e))
    }

    /// Shared reference to `e`'s `T`.
    pub fn get<T: Component>(&self, e: Entity) -> Option<&T> {
        let id = self.components.lookup::<T>()?;
        self.typed_pool(id)?.get(e)
    }

    /// Mutable reference to `e`'s `T`.
    pub fn get_mut<T: Component>(&mut self, e: Entity) -> Option<&mut T> {
        let id = self.components.lookup::<T>()?;
        self.typed_pool_mut::<T>(id)?.get_mut(e)
    }

    /// Number of live `T` components.
    pub fn count<T: Component>(&self) -> usize {
        self.components
            .lookup::<T>()
            .and_then(|id| self.pool_slot(id))
            .map_or(0, |p| p.len())
    }

    /// The signature of all non-empty pools.
    pub fn available_components(&self) -> &Signature {
        &self.available
    }

    /// The component-kind registry.
    pub fn component_registry(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Mutable access to the component-kind registry.
    pub fn component_registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    fn pool_slot(&self, id: ComponentId) -> Option<&dyn ComponentPool> {
        self.pools.get(id.index())?.as_deref()
    }

    fn typed_pool<T: Component>(&self, id: ComponentId) -> Option<&SparseSet<T>> {
        self.pool_slot(id)?.as_any().downcast_ref()
    }

    fn typed_pool_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut SparseSet<T>> {
        self.pools
            .get_mut(id.index())?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut()
    }

    // -- systems and the clock ----------------------------------------------

    /// Register a system with the given priority (lower runs earlier; ties
    /// keep registration order).
    pub fn add_system<S: System + 'static>(&mut self, priority: i32, system: S) {
        let signature = system.required_components(&mut self.components);
        tracing::debug!(
            system = system.name(),
            priority,
            required = signature.count(),
            "system registered"
        );
        self.systems
            .push(SystemEntry::new(Box::new(system), signature, priority));
        self.systems.sort_by_key(|s| s.priority);
        self.refresh_system_activity();
    }

    /// Enable or disable a system by name.
    pub fn set_system_enabled(&mut self, name: &str, enabled: bool) {
        for entry in &mut self.systems {
            if entry.system.name() == name {
                entry.enabled = enabled;
            }
        }
    }

    /// Registered system names, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Whether `name`'s requirement signature was satisfied at the last
    /// scheduling check.
    pub fn is_system_active(&self, name: &str) -> bool {
        self.systems
            .iter()
            .any(|s| s.system.name() == name && s.active)
    }

    /// Read access to the simulation clock.
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Mutable access to the simulation clock.
    pub fn clock_mut(&mut self) -> &mut GameClock {
        &mut self.clock
    }

    /// Advance the clock by `real_dt` seconds and run every due fixed step.
    ///
    /// Returns the number of steps executed (at most five). Within a step,
    /// enabled systems whose signatures are subsets of the availability
    /// bitset run in priority order with `fixed_delta_time * time_scale`.
    pub fn update(&mut self, real_dt: f32) -> u32 {
        let steps = self.clock.advance(real_dt);
        for _ in 0..steps {
            let dt = self.clock.step_dt();
            // Systems are moved out for the step so they can receive the
            // registry mutably; anything they add mid-step is merged back.
            let mut systems = std::mem::take(&mut self.systems);
            for entry in &mut systems {
                if entry.enabled && entry.signature.is_subset_of(&self.available) {
                    entry.system.run(self, dt);
                }
            }
            systems.append(&mut self.systems);
            self.systems = systems;
            self.refresh_system_activity();
        }
        steps
    }

    fn refresh_system_activity(&mut self) {
        for entry in &mut self.systems {
            let satisfied = entry.signature.is_subset_of(&self.available);
            if satisfied != entry.active {
                tracing::debug!(
                    system = entry.system.name(),
                    active = satisfied,
                    "system activation changed"
                );
                entry.active = satisfied;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

macro_rules! impl_each {
    ($(#[$doc:meta])* $fn_name:ident; $(($ty:ident, $pool:ident, $item:ident)),+) => {
        $(#[$doc])*
        pub fn $fn_name<$($ty: Component),+>(
            &mut self,
            mut f: impl FnMut(Entity, $(&mut $ty),+),
        ) {
            let ids = [$(self.components.id_of::<$ty>()),+];
            let mut seen = Signature::empty();
            for id in ids {
                if seen.test(id) {
                    debug_assert!(false, "component kinds in a join must be distinct");
                    return;
                }
                seen.set(id);
            }
            let idxs = ids.map(|id| id.index());
            // A kind with no pool yet makes the join empty.
            for &i in &idxs {
                if !matches!(self.pools.get(i), Some(Some(_))) {
                    return;
                }
            }
            // Pivot on the smallest pool; snapshot its dense entities so the
            // cursor is independent of later structural changes.
            let pivot = idxs
                .iter()
                .copied()
                .min_by_key(|&i| self.pools[i].as_ref().map_or(usize::MAX, |p| p.len()));
            let snapshot: Vec<Entity> = match pivot.and_then(|i| self.pools[i].as_ref()) {
                Some(p) => p.entities().to_vec(),
                None => return,
            };
            let Ok(taken) = self.pools.get_disjoint_mut(idxs) else {
                return;
            };
            let mut taken = taken.into_iter();
            $(
                let Some($pool) = taken
                    .next()
                    .and_then(|slot| slot.as_deref_mut())
                    .and_then(|p| p.as_any_mut().downcast_mut::<SparseSet<$ty>>())
                else {
                    debug_assert!(false, "component pool type mismatch");
                    return;
                };
            )+
            for e in snapshot {
                $(
                    let Some($item) = $pool.get_mut(e) else { continue; };
                )+
                f(e, $($item),+);
            }
        }
    };
}

impl Registry {
    impl_each!(
        /// Invoke `f` for every entity carrying an `A`.
        each1; (A, pool_a, item_a)
    );
    impl_each!(
        /// Invoke `f` for every entity carrying both `A` and `B`, in the
        /// iteration order of the smaller pool.
        each2; (A, pool_a, item_a), (B, pool_b, item_b)
    );
    impl_each!(
        /// Three-way join; see [`each2`](Registry::each2).
        each3; (A, pool_a, item_a), (B, pool_b, item_b), (C, pool_c, item_c)
    );
    impl_each!(
        /// Four-way join; see [`each2`](Registry::each2).
        each4; (A, pool_a, item_a), (B, pool_b, item_b), (C, pool_c, item_c),
            (D, pool_d, item_d)
    );
    impl_each!(
        /// Five-way join; see [`each2`](Registry::each2).
        each5; (A, pool_a, item_a), (B, pool_b, item_b), (C, pool_c, item_c),
            (D, pool_d, item_d), (E, pool_e, item_e)
    );
    impl_each!(
        /// Six-way join; see [`each2`](Registry::each2).
        each6; (A, pool_a, item_a), (B, pool_b, item_b), (C, pool_c, item_c),
            (D, pool_d, item_d), (E, pool_e, item_e), (F, pool_f, item_f)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
