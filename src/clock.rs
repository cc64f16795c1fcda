//! Repeating timers on one logical timeline
//!
//! The clock never reads wall time. The host advances it by elapsed
//! durations and takes due firings one at a time, earliest first, so each
//! firing runs to completion before the next one is looked at.
//!
//! Timers live in an arena of slots. A [`TimerHandle`] carries the slot's
//! generation, so a handle kept after its timer was cancelled can never
//! cancel the timer that later reuses the slot.

use std::time::Duration;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Timer<K> {
    period: Duration,
    next_due: Duration,
    kind: K,
}

#[derive(Debug, Clone)]
struct Slot<K> {
    generation: u32,
    timer: Option<Timer<K>>,
}

/// A set of repeating timers tagged with `K`
#[derive(Debug, Clone)]
pub struct Clock<K> {
    now: Duration,
    slots: Vec<Slot<K>>,
}

impl<K: Copy> Default for Clock<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Clock<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            slots: Vec::new(),
        }
    }

    /// Time elapsed on this clock
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule a timer that first fires one `period` from now and then
    /// every `period` after that. A zero period would fire forever without
    /// time passing, so it is refused.
    pub fn schedule(&mut self, period: Duration, kind: K) -> Option<TimerHandle> {
        if period.is_zero() {
            return None;
        }
        let timer = Timer {
            period,
            next_due: self.now + period,
            kind,
        };

        if let Some(index) = self.slots.iter().position(|s| s.timer.is_none()) {
            let slot = &mut self.slots[index];
            slot.timer = Some(timer);
            return Some(TimerHandle {
                index: index as u32,
                generation: slot.generation,
            });
        }

        self.slots.push(Slot {
            generation: 0,
            timer: Some(timer),
        });
        Some(TimerHandle {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        })
    }

    /// Cancel a timer. Returns false if the handle is stale.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.slots.get_mut(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.timer.is_some() => {
                slot.timer = None;
                slot.generation = slot.generation.wrapping_add(1);
                true
            }
            _ => false,
        }
    }

    /// Cancel every timer
    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            if slot.timer.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.timer.is_some())
    }

    /// Number of live timers
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.timer.is_some()).count()
    }

    /// Take the earliest firing due at or before `until`.
    ///
    /// Moves the clock to the firing time and re-arms the timer for its next
    /// period. Ties go to the lower slot, i.e. the timer scheduled first.
    pub fn next_firing(&mut self, until: Duration) -> Option<K> {
        let index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.timer.as_ref().map(|t| (i, t.next_due)))
            .filter(|&(_, due)| due <= until)
            .min_by_key(|&(i, due)| (due, i))
            .map(|(i, _)| i)?;

        let timer = self.slots[index].timer.as_mut()?;
        self.now = self.now.max(timer.next_due);
        timer.next_due += timer.period;
        Some(timer.kind)
    }

    /// Move the clock to `until` once all firings up to it were taken
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
