use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

struct Timer {
    interval: Duration,
    next_trigger: Instant,
}

impl Timer {
    fn trigger(&mut self, now: Instant) {
        // A late tick fires once, it does not replay every missed interval
        self.next_trigger += self.interval;
        if self.next_trigger <= now {
            self.next_trigger = now + self.interval;
        }
    }

    fn should_trigger(&self, now: Instant) -> bool {
        now >= self.next_trigger
    }
}

pub type TimerHandle = usize;

/// Repeating timers driven by the owner's frame loop. `tick` reports which
/// timers fired and the owner decides what to run for each handle.
pub struct TimerManager {
    timers: HashMap<TimerHandle, Timer>,
    current_handle: TimerHandle,
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            timers: HashMap::new(),
            current_handle: 0,
        }
    }

    /// First trigger happens one `interval` after `now`.
    pub fn schedule(&mut self, now: Instant, interval: Duration) -> TimerHandle {
        let handle = self.current_handle;
        self.timers.insert(
            handle,
            Timer {
                interval,
                next_trigger: now + interval,
            },
        );
        self.current_handle += 1;
        debug!("Timer {} scheduled every {:?}", handle, interval);
        handle
    }

    pub fn remove(&mut self, timer_handle: TimerHandle) {
        self.timers.remove(&timer_handle);
    }

    pub fn is_active(&self, timer_handle: TimerHandle) -> bool {
        self.timers.contains_key(&timer_handle)
    }

    pub fn tick(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut fired = Vec::new();
        for (&handle, timer) in self.timers.iter_mut() {
            if timer.should_trigger(now) {
                timer.trigger(now);
                fired.push(handle);
            }
        }
        fired.sort_unstable();
        fired
    }
}
