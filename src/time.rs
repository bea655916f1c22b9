use std::thread::{sleep, yield_now};
use std::time::{Duration, Instant};

pub const ZERO: Duration = Duration::from_millis(0);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameLimitStrategy {
    /// Single yield
    Unlimited,
    /// Sleep until Duration remaining and then yield
    SleepAndYield(Duration),
}

/// Caps the redraw rate so the net poll gets the rest of each frame.
pub struct FrameLimit {
    pub strategy: FrameLimitStrategy,
    pub frame_duration: Duration,
    pub last_frame: Instant,
}

impl FrameLimit {
    pub fn new(strategy: FrameLimitStrategy, max_fps: u32) -> Self {
        let (strategy, frame_duration) = if max_fps == 0 {
            (FrameLimitStrategy::Unlimited, ZERO)
        } else {
            (strategy, Duration::from_secs(1) / max_fps)
        };
        Self {
            strategy,
            frame_duration,
            last_frame: Instant::now(),
        }
    }

    /// Time left in the current frame.
    pub fn remaining(&self, now: Instant) -> Duration {
        (self.last_frame + self.frame_duration)
            .checked_duration_since(now)
            .unwrap_or(ZERO)
    }

    pub fn run(&mut self) {
        if let FrameLimitStrategy::SleepAndYield(spin) = self.strategy {
            let remaining = self.remaining(Instant::now());
            if remaining > spin {
                sleep(remaining - spin);
            }
            while self.remaining(Instant::now()) > ZERO {
                yield_now();
            }
        } else {
            yield_now();
        }

        self.last_frame = Instant::now();
    }
}

pub struct Time {
    pub started_at: Instant,
    pub current: Instant,
    pub next_wanted_tick: Instant,
    pub tick_count: u64,
    /// Seconds since the previous tick
    pub delta: f32,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started_at: now,
            current: now,
            next_wanted_tick: now,
            tick_count: 0,
            delta: 0.0,
        }
    }

    pub fn tick(&mut self, frame_limit: &FrameLimit) {
        let now = Instant::now();
        self.delta = (now - self.current).as_secs_f32();
        self.current = now;
        self.next_wanted_tick += frame_limit.frame_duration;
        // Fell behind, don't try to catch up
        if self.next_wanted_tick < now {
            self.next_wanted_tick = now;
        }
        self.tick_count += 1;
    }
}
