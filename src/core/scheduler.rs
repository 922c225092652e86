//! Single-slot deferred action scheduling driven by the 100ms tick.
//!
//! At most one action is outstanding. Scheduling a new one displaces the
//! old one, so two board mutations can never land out of order.

/// An action waiting for its delay to elapse.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<A> {
    action: A,
    elapsed_ticks: u32,
    target_ticks: u32,
}

/// Cancellable `schedule_once` slot. Call [`DeferredSlot::tick`] once per
/// game tick; it hands back the action when its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredSlot<A> {
    pending: Option<Pending<A>>,
}

impl<A> Default for DeferredSlot<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> DeferredSlot<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `delay_ticks` ticks, replacing any
    /// outstanding action. Returns the displaced action, if there was one.
    pub fn schedule_once(&mut self, delay_ticks: u32, action: A) -> Option<A> {
        let displaced = self.cancel();
        self.pending = Some(Pending {
            action,
            elapsed_ticks: 0,
            target_ticks: delay_ticks,
        });
        displaced
    }

    /// Drop the outstanding action without firing it.
    pub fn cancel(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.action)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance one tick. Returns the action once its delay has elapsed,
    /// clearing the slot.
    pub fn tick(&mut self) -> Option<A> {
        let pending = self.pending.as_mut()?;
        pending.elapsed_ticks += 1;
        if pending.elapsed_ticks >= pending.target_ticks {
            return self.cancel();
        }
        None
    }
}
