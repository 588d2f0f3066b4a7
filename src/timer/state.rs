use serde::{Deserialize, Serialize};

use crate::settings::{BlockPlan, BlockSettings};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SchedulerStatus {
    /// Not started yet.
    Idle,
    /// Wait timer armed; fires after an uninterrupted idle period.
    Waiting,
    /// Overlay up; no wait timer exists.
    Blocking,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        SchedulerStatus::Idle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    pub status: SchedulerStatus,
    /// Deadline of the pending wait timer. Set only while `Waiting`.
    pub deadline_ms: Option<u64>,
    /// Duration of the block that fires at `deadline_ms`.
    pub pending_block_secs: u64,
    /// No block has fired yet this session.
    pub first_block_pending: bool,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            status: SchedulerStatus::Idle,
            deadline_ms: None,
            pending_block_secs: 0,
            first_block_pending: true,
        }
    }
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan for the next block: the first-block durations until one has fired,
    /// follow-up durations afterwards.
    pub fn current_plan(&self, settings: &BlockSettings) -> BlockPlan {
        if self.first_block_pending {
            settings.first_plan()
        } else {
            settings.followup_plan()
        }
    }

    /// Cancel any pending wait and arm a new one starting at `from_ms`.
    pub fn schedule_next(&mut self, from_ms: u64, settings: &BlockSettings) -> BlockPlan {
        let plan = self.current_plan(settings);
        self.status = SchedulerStatus::Waiting;
        self.deadline_ms = Some(from_ms.saturating_add(plan.wait_ms()));
        self.pending_block_secs = plan.block_secs;
        plan
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        matches!(
            (self.status, self.deadline_ms),
            (SchedulerStatus::Waiting, Some(deadline)) if now_ms >= deadline
        )
    }

    /// Consume the expired wait timer. Returns the deadline it was armed for
    /// and the block duration to show.
    pub fn fire(&mut self) -> Option<(u64, u64)> {
        if self.status != SchedulerStatus::Waiting {
            return None;
        }
        let deadline = self.deadline_ms?;
        let block_secs = self.pending_block_secs;
        self.begin_block();
        Some((deadline, block_secs))
    }

    /// Enter `Blocking`, dropping any pending wait.
    pub fn begin_block(&mut self) {
        self.status = SchedulerStatus::Blocking;
        self.deadline_ms = None;
        self.first_block_pending = false;
    }

    pub fn remaining_wait_ms(&self, now_ms: u64) -> Option<u64> {
        match self.status {
            SchedulerStatus::Waiting => self.deadline_ms.map(|deadline| deadline.saturating_sub(now_ms)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BlockSettings {
        BlockSettings {
            first_block_wait_time: 20,
            first_block_duration: 7,
            followup_block_wait_time: 60,
            followup_block_duration: 3,
        }
    }

    #[test]
    fn first_plan_survives_rescheduling_until_a_block_fires() {
        let mut state = SchedulerState::new();
        let settings = settings();

        state.schedule_next(0, &settings);
        state.schedule_next(4_000, &settings);
        assert_eq!(state.deadline_ms, Some(24_000));
        assert_eq!(state.pending_block_secs, 7);

        assert!(!state.is_due(23_999));
        assert!(state.is_due(24_000));
        assert_eq!(state.fire(), Some((24_000, 7)));
        assert_eq!(state.status, SchedulerStatus::Blocking);
        assert_eq!(state.deadline_ms, None);

        let plan = state.schedule_next(31_000, &settings);
        assert_eq!(plan, BlockPlan { wait_secs: 60, block_secs: 3 });
        assert_eq!(state.deadline_ms, Some(91_000));
    }

    #[test]
    fn fire_requires_an_armed_timer() {
        let mut state = SchedulerState::new();
        assert_eq!(state.fire(), None);
        state.begin_block();
        assert_eq!(state.fire(), None);
        assert!(!state.is_due(u64::MAX));
    }

    #[test]
    fn remaining_wait_only_while_waiting() {
        let mut state = SchedulerState::new();
        assert_eq!(state.remaining_wait_ms(0), None);
        state.schedule_next(1_000, &settings());
        assert_eq!(state.remaining_wait_ms(5_000), Some(16_000));
        assert_eq!(state.remaining_wait_ms(30_000), Some(0));
    }
}
