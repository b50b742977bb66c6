//! Full parameter-table download bookkeeping
//!
//! [`ParamSync`] holds the state of one download and decides what the
//! supervisor should do next. It performs no I/O and owns no timers: the
//! host runs the retry supervisor and debounce timer, and asks this type,
//! under its lock, whether an action still applies.
//!
//! # Generations
//!
//! Every accepted `begin` starts a new generation. Timers capture the
//! generation they were spawned for and pass it back; a timer belonging to
//! a finished or superseded download is answered with "do nothing".

use alloc::collections::BTreeSet;

use crate::protocol::messages::ParamValue;

/// Result of feeding one PARAM_VALUE into the bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncProgress {
    /// No download in progress; the value was not counted
    Idle,
    /// Counted (or deduplicated); download continues
    Progress { received: usize, declared: Option<u16> },
    /// This value completed the table. Arm the debounce timer for `generation`.
    Complete { generation: u64 },
    /// Index outside the declared count, dropped
    OutOfRange { index: u16 },
}

/// What the retry supervisor should do at a round deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Nothing arrived yet, send the list request again
    Resend,
    /// Values are arriving, stop resending
    DataFlowing,
    /// Download finished or superseded, supervisor exits
    Stop,
}

/// Final result of a download, signalled once per generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSyncOutcome {
    /// Every declared index arrived
    Complete { count: u16 },
    /// Retries exhausted with only part of the table received
    Partial { received: usize, declared: Option<u16> },
    /// Retries exhausted without a single value
    NoResponse,
}

#[derive(Debug, Default)]
pub struct ParamSync {
    downloading: bool,
    declared_count: Option<u16>,
    received: BTreeSet<u16>,
    /// Values without an index (23-byte variant), not counted
    unindexed: usize,
    last_received_at_us: Option<u64>,
    generation: u64,
    /// Generation whose outcome has already been signalled
    signalled: Option<u64>,
}

impl ParamSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new download.
    ///
    /// Returns the new generation, or `None` if a download is already in
    /// progress (the request is then a no-op).
    pub fn begin(&mut self) -> Option<u64> {
        if self.downloading {
            return None;
        }
        self.downloading = true;
        self.declared_count = None;
        self.received.clear();
        self.unindexed = 0;
        self.last_received_at_us = None;
        self.generation = self.generation.wrapping_add(1);
        Some(self.generation)
    }

    /// Account for one received PARAM_VALUE.
    pub fn on_value(&mut self, value: &ParamValue, now_us: u64) -> SyncProgress {
        if !self.downloading {
            return SyncProgress::Idle;
        }
        self.last_received_at_us = Some(now_us);

        let Some(index) = value.index else {
            self.unindexed += 1;
            return self.progress();
        };

        if self.declared_count.is_none() {
            self.declared_count = value.count;
        }
        match self.declared_count {
            // Empty table: the index carries nothing to count
            Some(0) => {}
            Some(declared) if index >= declared => return SyncProgress::OutOfRange { index },
            _ => {
                self.received.insert(index);
            }
        }

        match self.declared_count {
            Some(declared) if self.received.len() >= usize::from(declared) => {
                self.downloading = false;
                SyncProgress::Complete {
                    generation: self.generation,
                }
            }
            _ => self.progress(),
        }
    }

    /// Decision for the retry supervisor of `generation` at a round deadline.
    pub fn retry_decision(&self, generation: u64) -> RetryDecision {
        if !self.downloading || generation != self.generation {
            RetryDecision::Stop
        } else if self.received.is_empty() && self.unindexed == 0 {
            RetryDecision::Resend
        } else {
            RetryDecision::DataFlowing
        }
    }

    /// Called once the retry rounds are spent and the download has stalled.
    ///
    /// Ends `generation` if it is still downloading and returns the partial
    /// outcome, or [`ParamSyncOutcome::NoResponse`] when nothing arrived.
    pub fn force_complete(&mut self, generation: u64) -> Option<ParamSyncOutcome> {
        if !self.downloading || generation != self.generation {
            return None;
        }
        self.downloading = false;
        if self.received.is_empty() && self.unindexed == 0 {
            self.signalled = Some(generation);
            return Some(ParamSyncOutcome::NoResponse);
        }
        self.take_outcome(generation)
    }

    /// Called when the debounce timer of a completed download fires.
    ///
    /// Yields the outcome exactly once per generation.
    pub fn take_completion(&mut self, generation: u64) -> Option<ParamSyncOutcome> {
        if self.downloading || generation != self.generation {
            return None;
        }
        self.take_outcome(generation)
    }

    /// Abandon any download in progress (link teardown).
    pub fn cancel(&mut self) {
        self.downloading = false;
        self.signalled = Some(self.generation);
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    pub fn declared_count(&self) -> Option<u16> {
        self.declared_count
    }

    pub fn received_count(&self) -> usize {
        self.received.len()
    }

    pub fn last_received_at_us(&self) -> Option<u64> {
        self.last_received_at_us
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn progress(&self) -> SyncProgress {
        SyncProgress::Progress {
            received: self.received.len(),
            declared: self.declared_count,
        }
    }

    fn take_outcome(&mut self, generation: u64) -> Option<ParamSyncOutcome> {
        if self.signalled == Some(generation) {
            return None;
        }
        self.signalled = Some(generation);
        Some(match self.declared_count {
            Some(count) if self.received.len() >= usize::from(count) => {
                ParamSyncOutcome::Complete { count }
            }
            declared => ParamSyncOutcome::Partial {
                received: self.received.len(),
                declared,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamName, ParamType};

    fn value(index: u16, count: u16) -> ParamValue {
        ParamValue {
            name: ParamName::try_from("P").unwrap(),
            value: f32::from(index),
            param_type: ParamType::Real32,
            index: Some(index),
            count: Some(count),
        }
    }

    #[test]
    fn test_begin_is_noop_while_downloading() {
        let mut sync = ParamSync::new();
        assert_eq!(sync.begin(), Some(1));
        assert_eq!(sync.begin(), None);
        assert!(sync.is_downloading());
    }

    #[test]
    fn test_values_ignored_when_idle() {
        let mut sync = ParamSync::new();
        assert_eq!(sync.on_value(&value(0, 3), 0), SyncProgress::Idle);
        assert_eq!(sync.received_count(), 0);
    }

    #[test]
    fn test_completion_once_with_duplicate_index() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();

        assert!(matches!(sync.on_value(&value(0, 3), 10), SyncProgress::Progress { received: 1, .. }));
        assert!(matches!(sync.on_value(&value(1, 3), 20), SyncProgress::Progress { received: 2, .. }));
        // Retransmitted index is deduplicated
        assert!(matches!(sync.on_value(&value(1, 3), 30), SyncProgress::Progress { received: 2, .. }));
        assert_eq!(
            sync.on_value(&value(2, 3), 40),
            SyncProgress::Complete { generation }
        );
        // Late duplicate after completion does not re-arm
        assert_eq!(sync.on_value(&value(1, 3), 50), SyncProgress::Idle);

        assert_eq!(
            sync.take_completion(generation),
            Some(ParamSyncOutcome::Complete { count: 3 })
        );
        assert_eq!(sync.take_completion(generation), None);
    }

    #[test]
    fn test_empty_table_completes_on_first_value() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();

        assert_eq!(sync.on_value(&value(0, 0), 10), SyncProgress::Complete { generation });
        assert!(!sync.is_downloading());
        assert_eq!(sync.received_count(), 0);
        assert_eq!(
            sync.take_completion(generation),
            Some(ParamSyncOutcome::Complete { count: 0 })
        );
        assert_eq!(sync.force_complete(generation), None);
    }

    #[test]
    fn test_declared_count_latches_from_first_value() {
        let mut sync = ParamSync::new();
        sync.begin();
        sync.on_value(&value(0, 2), 0);
        // A later, different count is ignored
        sync.on_value(&value(1, 10), 0);
        assert_eq!(sync.declared_count(), Some(2));
        assert!(!sync.is_downloading());
    }

    #[test]
    fn test_out_of_range_index_not_counted() {
        let mut sync = ParamSync::new();
        sync.begin();
        sync.on_value(&value(0, 2), 0);
        assert_eq!(sync.on_value(&value(5, 2), 0), SyncProgress::OutOfRange { index: 5 });
        assert_eq!(sync.received_count(), 1);
    }

    #[test]
    fn test_retry_decisions() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();
        assert_eq!(sync.retry_decision(generation), RetryDecision::Resend);
        assert_eq!(sync.retry_decision(generation + 1), RetryDecision::Stop);

        sync.on_value(&value(0, 5), 0);
        assert_eq!(sync.retry_decision(generation), RetryDecision::DataFlowing);
    }

    #[test]
    fn test_force_complete_reports_partial() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();
        sync.on_value(&value(0, 4), 0);
        sync.on_value(&value(2, 4), 0);

        assert_eq!(
            sync.force_complete(generation),
            Some(ParamSyncOutcome::Partial {
                received: 2,
                declared: Some(4)
            })
        );
        assert!(!sync.is_downloading());
        assert_eq!(sync.force_complete(generation), None);
        assert_eq!(sync.take_completion(generation), None);
    }

    #[test]
    fn test_force_complete_without_data_reports_no_response() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();
        assert_eq!(sync.force_complete(generation), Some(ParamSyncOutcome::NoResponse));
        assert!(!sync.is_downloading());
        assert_eq!(sync.force_complete(generation), None);
        // A new request may start afterwards
        assert!(sync.begin().is_some());
    }

    #[test]
    fn test_unindexed_values_refresh_activity_only() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();
        let mut v = value(0, 3);
        v.index = None;
        sync.on_value(&v, 99);
        assert_eq!(sync.received_count(), 0);
        assert_eq!(sync.last_received_at_us(), Some(99));
        assert_eq!(sync.retry_decision(generation), RetryDecision::DataFlowing);
    }

    #[test]
    fn test_stale_generation_timer_is_ignored() {
        let mut sync = ParamSync::new();
        let first = sync.begin().unwrap();
        sync.on_value(&value(0, 1), 0);
        let second = sync.begin().unwrap();
        assert_ne!(first, second);
        assert_eq!(sync.take_completion(first), None);
    }

    #[test]
    fn test_cancel_suppresses_outcome() {
        let mut sync = ParamSync::new();
        let generation = sync.begin().unwrap();
        sync.on_value(&value(0, 1), 0);
        sync.cancel();
        assert_eq!(sync.take_completion(generation), None);
    }
}
