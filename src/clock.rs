use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Monotonic millisecond time source driving the controller.
///
/// Every timestamp the scheduler and countdown deal in comes from one clock, so
/// a test can swap in [`ManualClock`] and step through a whole wait/block cycle
/// without sleeping.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, delta_secs: u64) {
        self.advance_ms(delta_secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Largest delay a browser `setTimeout` honours. Anything above it wraps to
/// zero and fires immediately.
pub const MAX_TIMER_DELAY_MS: u64 = i32::MAX as u64;

/// Delay to arm a host timer with for `deadline_ms`. Past deadlines fire at
/// once; far deadlines are capped, and the wake-up re-arms for the rest.
pub fn timer_delay_ms(deadline_ms: u64, now_ms: u64) -> u32 {
    deadline_ms.saturating_sub(now_ms).min(MAX_TIMER_DELAY_MS) as u32
}

/// Host timer handles: the one pending and the last one that fired.
///
/// A fired handle stays in `spent` until the next timer fires, so it is
/// released only after its own callback has returned.
#[derive(Debug)]
pub struct TimerSlot<H> {
    pending: Option<H>,
    spent: Option<H>,
}

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self {
            pending: None,
            spent: None,
        }
    }
}

impl<H> TimerSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending handle. The old one is dropped, which cancels it.
    pub fn arm(&mut self, handle: H) {
        self.pending = Some(handle);
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// The pending timer fired: park it and release the previous spent one.
    pub fn fired(&mut self) {
        self.spent = self.pending.take();
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

/// Wraps a clock so readings never go backwards.
#[derive(Debug, Default)]
pub struct Monotonic<C> {
    inner: C,
    last_ms: AtomicU64,
}

impl<C: Clock> Monotonic<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last_ms: AtomicU64::new(0),
        }
    }
}

impl<C: Clock> Clock for Monotonic<C> {
    fn now_ms(&self) -> u64 {
        let now = self.inner.now_ms();
        let previous = self.last_ms.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

/// Clock backed by `tokio::time`, so paused-time tests drive it too.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    /// The instant a clock reading corresponds to.
    pub fn instant_at(&self, at_ms: u64) -> tokio::time::Instant {
        self.origin + std::time::Duration::from_millis(at_ms)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
