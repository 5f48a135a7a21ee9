//! System trait and scheduling metadata.
//!
//! A system is a unit of behaviour run once per fixed step. Each system
//! declares the component kinds it needs as a [`Signature`]; the registry
//! skips a system while any required pool is empty, so adding the first
//! component of a kind is what switches the dependent systems on.

use crate::component::{ComponentRegistry, Signature};
use crate::registry::Registry;

/// A schedulable unit of game behaviour.
///
/// Systems are owned by the [`Registry`] and invoked in ascending priority
/// order (ties break by registration order). `run` receives the registry and
/// the fixed step's `dt`; structural mutations made inside a join must be
/// deferred to after the join returns (see [`Registry::each2`] and friends).
pub trait System: Send {
    /// Name used in logs and scheduling diagnostics.
    fn name(&self) -> &'static str;

    /// The component kinds this system requires, registered on first use.
    ///
    /// Called once when the system is added; the result is cached by the
    /// registry.
    fn required_components(&self, components: &mut ComponentRegistry) -> Signature;

    /// Execute one fixed step.
    fn run(&mut self, registry: &mut Registry, dt: f32);
}

/// Registry-side bookkeeping for one registered system.
pub(crate) struct SystemEntry {
    pub(crate) system: Box<dyn System>,
    pub(crate) signature: Signature,
    pub(crate) priority: i32,
    pub(crate) enabled: bool,
    /// Whether the signature was satisfied at the last scheduling check.
    pub(crate) active: bool,
}

impl SystemEntry {
    pub(crate) fn new(system: Box<dyn System>, signature: Signature, priority: i32) -> Self {
        Self {
            system,
            signature,
            priority,
            enabled: true,
            active: false,
        }
    }
}
