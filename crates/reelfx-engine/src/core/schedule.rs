//! Deferred work owned by effect handles.
//!
//! Every delayed start, staggered spawn and cleanup deadline is an entry
//! here, tagged with the handle that created it, so stopping an effect is a
//! single `cancel_owner` call instead of hunting down stray timers.

use crate::api::types::EffectHandle;

/// Identifies one scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

#[derive(Debug, Clone)]
struct Entry<A> {
    id: TimerId,
    owner: EffectHandle,
    due: f32,
    action: A,
}

/// Time-ordered queue of actions of type `A`.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    entries: Vec<Entry<A>>,
    next_id: u32,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` for `owner` at absolute time `due`.
    pub fn schedule_at(&mut self, owner: EffectHandle, due: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry { id, owner, due, action });
        id
    }

    /// Queue `action` for `owner`, `delay` seconds after `now`.
    pub fn schedule(&mut self, owner: EffectHandle, now: f32, delay: f32, action: A) -> TimerId {
        self.schedule_at(owner, now + delay.max(0.0), action)
    }

    /// Cancel a single entry. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel everything `owner` scheduled. Returns how many entries were dropped.
    pub fn cancel_owner(&mut self, owner: EffectHandle) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.owner != owner);
        before - self.entries.len()
    }

    /// Remove and return every entry due at or before `now`, earliest first;
    /// entries due at the same instant keep their scheduling order.
    pub fn drain_due(&mut self, now: f32) -> Vec<(EffectHandle, A)> {
        if !self.entries.iter().any(|e| e.due <= now) {
            return Vec::new();
        }
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due.into_iter().map(|e| (e.owner, e.action)).collect()
    }

    /// Number of pending entries owned by `owner`.
    pub fn pending_for(&self, owner: EffectHandle) -> usize {
        self.entries.iter().filter(|e| e.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
