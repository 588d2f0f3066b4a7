pub const TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Running(u64),
    Finished,
}

/// Whole-second countdown shown on the overlay.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining_secs: u64,
    next_tick_ms: u64,
}

impl Countdown {
    pub fn start(duration_secs: u64, now_ms: u64) -> Self {
        Self {
            remaining_secs: duration_secs,
            next_tick_ms: now_ms.saturating_add(TICK_MS),
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn next_tick_ms(&self) -> u64 {
        self.next_tick_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_tick_ms
    }

    /// Consume one tick. Returns the tick's own timestamp with the step so the
    /// caller can chain follow-up work from when the tick was scheduled rather
    /// than when it was observed.
    pub fn tick(&mut self) -> (u64, CountdownStep) {
        let at_ms = self.next_tick_ms;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.next_tick_ms = at_ms.saturating_add(TICK_MS);
        let step = if self.remaining_secs == 0 {
            CountdownStep::Finished
        } else {
            CountdownStep::Running(self.remaining_secs)
        };
        (at_ms, step)
    }
}
