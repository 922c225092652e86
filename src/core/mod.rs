//! Timing constants and the tick-driven deferred-action slot.

pub mod constants;
pub mod scheduler;

pub use constants::*;
pub use scheduler::DeferredSlot;
