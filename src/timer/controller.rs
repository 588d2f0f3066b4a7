use serde::Serialize;

use crate::{
    activity::ActivityKind,
    clock::Clock,
    models::{SessionSnapshot, SessionState},
    overlay::{
        find_search_box, occluding_bands, ActiveOverlay, Countdown, CountdownStep, OverlayMessage,
        OverlayStrategy, OverlaySurface, OverlayView,
    },
    settings::BlockSettings,
};

use super::{
    commands::{BlockQuery, BlockQueryResponse},
    SchedulerState, SchedulerStatus,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub session: SessionSnapshot,
    pub status: SchedulerStatus,
    pub wait_remaining_ms: Option<u64>,
    pub countdown_remaining_secs: Option<u64>,
}

/// Owns the session counters, the wait scheduler and the overlay singleton.
///
/// All transitions go through here and read time from one [`Clock`]. The
/// host arms a single timer for [`next_deadline_ms`](Self::next_deadline_ms)
/// and calls [`advance`](Self::advance) when it fires; at most one of
/// "wait timer armed" and "overlay up" holds at any moment.
pub struct BlockController<C, S: OverlaySurface> {
    settings: BlockSettings,
    strategy: OverlayStrategy,
    clock: C,
    surface: S,
    session: SessionState,
    scheduler: SchedulerState,
    overlay: Option<ActiveOverlay<S::Element>>,
}

impl<C: Clock, S: OverlaySurface> BlockController<C, S> {
    pub fn new(settings: BlockSettings, strategy: OverlayStrategy, clock: C, surface: S) -> Self {
        let session = SessionState::begin(clock.now_ms());
        Self {
            settings,
            strategy,
            clock,
            surface,
            session,
            scheduler: SchedulerState::new(),
            overlay: None,
        }
    }

    /// Arm the first wait timer. Returns `false` if already started.
    pub fn start(&mut self) -> bool {
        if self.scheduler.status != SchedulerStatus::Idle {
            return false;
        }
        let now = self.clock.now_ms();
        let plan = self.scheduler.schedule_next(now, &self.settings);
        log_info!(
            "session {} started: first block after {}s idle, lasting {}s ({:?})",
            self.session.id,
            plan.wait_secs,
            plan.block_secs,
            self.strategy
        );
        true
    }

    /// Restart the idle countdown. Ignored before `start` and while a block is
    /// showing, so input can never shorten a block.
    pub fn on_activity(&mut self, kind: ActivityKind) -> bool {
        if self.scheduler.status != SchedulerStatus::Waiting {
            return false;
        }
        let now = self.clock.now_ms();
        let plan = self.scheduler.schedule_next(now, &self.settings);
        log_debug!("{} re-armed wait timer for {}s", kind.event_name(), plan.wait_secs);
        true
    }

    /// Apply every transition that is due by now: expired wait timers open the
    /// overlay, countdown ticks update it, the last tick tears it down and arms
    /// the next wait. Follow-up work is chained from when each event was due,
    /// so a late call catches up exactly.
    pub fn advance(&mut self) {
        let now = self.clock.now_ms();
        loop {
            if self.scheduler.is_due(now) {
                if let Some((fired_at, block_secs)) = self.scheduler.fire() {
                    self.open_overlay(block_secs, fired_at);
                }
                continue;
            }

            let Some(overlay) = self.overlay.as_mut() else {
                break;
            };
            if !overlay.countdown.is_due(now) {
                break;
            }
            let (tick_at, step) = overlay.countdown.tick();
            match step {
                CountdownStep::Running(remaining) => self.surface.update_countdown(remaining),
                CountdownStep::Finished => {
                    self.surface.update_countdown(0);
                    self.close_overlay(tick_at);
                }
            }
        }
    }

    /// Show a block right now. No-op (returns `false`) while one is up.
    pub fn trigger(&mut self, duration_secs: u64) -> bool {
        let now = self.clock.now_ms();
        self.open_overlay(duration_secs, now)
    }

    /// Recompute the bands from the search box's current position. Called by
    /// the surface's resize/scroll listeners.
    pub fn relayout(&mut self) {
        if self.strategy != OverlayStrategy::Cutout {
            return;
        }
        let Some(overlay) = self.overlay.as_ref() else {
            return;
        };
        let search_box = overlay
            .search_box
            .as_ref()
            .map(|element| self.surface.bounding_rect(element));
        let bands = occluding_bands(self.surface.viewport(), search_box);
        self.surface.update_bands(&bands);
    }

    /// When the host's single timer should fire next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        match &self.overlay {
            Some(overlay) => Some(overlay.countdown.next_tick_ms()),
            None => self.scheduler.deadline_ms,
        }
    }

    pub fn answer(&self, query: BlockQuery) -> BlockQueryResponse {
        match query {
            BlockQuery::GetAddictionTime => BlockQueryResponse::AddictionTime {
                time: self.elapsed_secs(),
            },
            BlockQuery::GetBlockCount => BlockQueryResponse::BlockCount {
                count: self.block_count(),
            },
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.session.elapsed_secs(self.clock.now_ms())
    }

    pub fn block_count(&self) -> u32 {
        self.session.block_count()
    }

    pub fn status(&self) -> SchedulerStatus {
        self.scheduler.status
    }

    pub fn is_blocking(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let now = self.clock.now_ms();
        ControllerSnapshot {
            session: self.session.snapshot(now),
            status: self.scheduler.status,
            wait_remaining_ms: self.scheduler.remaining_wait_ms(now),
            countdown_remaining_secs: self
                .overlay
                .as_ref()
                .map(|overlay| overlay.countdown.remaining_secs()),
        }
    }

    pub fn settings(&self) -> &BlockSettings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn open_overlay(&mut self, block_secs: u64, at_ms: u64) -> bool {
        if self.overlay.is_some() {
            log_debug!("block already showing; trigger ignored");
            return false;
        }

        self.scheduler.begin_block();
        let occurrence = self.session.record_block();
        let message = OverlayMessage {
            countdown_secs: block_secs,
            occurrence,
        };
        let viewport = self.surface.viewport();

        let (view, search_box) = match self.strategy {
            OverlayStrategy::FullBlock => (OverlayView::full_block(viewport, message), None),
            OverlayStrategy::Cutout => {
                let found = find_search_box(&self.surface);
                let rect = found.as_ref().map(|(_, rect)| *rect);
                (
                    OverlayView::cutout(viewport, rect, message),
                    found.map(|(element, _)| element),
                )
            }
        };

        self.surface.mount(&view);
        let listeners_attached = view.strategy == OverlayStrategy::Cutout;
        if listeners_attached {
            self.surface.attach_relayout_listeners();
        }

        log_info!(
            "block #{occurrence} showing for {block_secs}s ({} band(s), search box {})",
            view.bands.len(),
            if search_box.is_some() { "kept visible" } else { "not found" }
        );

        self.overlay = Some(ActiveOverlay {
            countdown: Countdown::start(block_secs, at_ms),
            occurrence,
            search_box,
            listeners_attached,
        });
        true
    }

    fn close_overlay(&mut self, at_ms: u64) {
        let Some(overlay) = self.overlay.take() else {
            return;
        };
        if overlay.listeners_attached {
            self.surface.detach_relayout_listeners();
        }
        self.surface.unmount();

        let plan = self.scheduler.schedule_next(at_ms, &self.settings);
        log_info!(
            "block #{} lifted; next after {}s idle",
            overlay.occurrence,
            plan.wait_secs
        );
    }
}
