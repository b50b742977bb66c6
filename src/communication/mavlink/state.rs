//! Shared link state
//!
//! Everything the reader task and the public API both touch lives in one
//! [`SharedState`] behind a single `std::sync::Mutex`:
//!
//! - **Target lock**: which vehicle outbound frames address
//! - **Parameter sync**: download bookkeeping and generation counter
//! - **Parameter cache**: last record seen for every name
//! - **Write waiters**: pending parameter writes keyed by name
//!
//! The lock is never held across an `.await`.

use std::collections::{BTreeMap, HashMap};

use groundlink_core::params::{normalize_name, ParamEcho, ParamRecord, ParamSync};
use groundlink_core::target::TargetLock;
use tokio::sync::oneshot;

pub struct SharedState {
    pub target: TargetLock,
    pub param_sync: ParamSync,
    pub params: BTreeMap<String, ParamRecord>,
    pub waiters: WaiterTable,
}

impl SharedState {
    pub fn new(expected_vehicle_type: u8) -> Self {
        Self {
            target: TargetLock::new(expected_vehicle_type),
            param_sync: ParamSync::new(),
            params: BTreeMap::new(),
            waiters: WaiterTable::default(),
        }
    }

    /// Link teardown: unlock, abandon the download, close every waiter.
    pub fn teardown(&mut self) {
        self.target.reset();
        self.param_sync.cancel();
        self.waiters.close();
    }
}

/// Pending parameter writes.
///
/// Several writers may wait on the same name; an echo resolves all of
/// them. Dropping a sender (timeout pruning or [`WaiterTable::close`])
/// wakes the receiver with a `RecvError`.
#[derive(Debug, Default)]
pub struct WaiterTable {
    waiters: HashMap<String, Vec<oneshot::Sender<ParamEcho>>>,
    closed: bool,
}

impl WaiterTable {
    /// Add a waiter for `name`, or `None` once the table is closed.
    pub fn register(&mut self, name: &str) -> Option<oneshot::Receiver<ParamEcho>> {
        if self.closed {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        self.waiters
            .entry(normalize_name(name).to_string())
            .or_default()
            .push(tx);
        Some(rx)
    }

    /// Deliver an echo to every waiter of `name`.
    ///
    /// Returns how many live waiters received it.
    pub fn resolve(&mut self, name: &str, echo: ParamEcho) -> usize {
        let Some(senders) = self.waiters.remove(normalize_name(name)) else {
            return 0;
        };
        senders
            .into_iter()
            .filter_map(|tx| tx.send(echo).ok())
            .count()
    }

    /// Drop senders whose receiver has gone away.
    pub fn prune(&mut self, name: &str) {
        let key = normalize_name(name);
        if let Some(senders) = self.waiters.get_mut(key) {
            senders.retain(|tx| !tx.is_closed());
            if senders.is_empty() {
                self.waiters.remove(key);
            }
        }
    }

    /// Wake every waiter with an error and refuse new ones.
    pub fn close(&mut self) {
        self.waiters.clear();
        self.closed = true;
    }

    pub fn pending(&self, name: &str) -> usize {
        self.waiters
            .get(normalize_name(name))
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundlink_core::params::ParamType;

    fn echo(value: f32) -> ParamEcho {
        ParamEcho {
            value,
            param_type: ParamType::Real32,
        }
    }

    #[test]
    fn test_resolve_fans_out_to_all_waiters() {
        let mut table = WaiterTable::default();
        let mut a = table.register("ATC_RAT_RLL_P").unwrap();
        let mut b = table.register(" ATC_RAT_RLL_P ").unwrap();
        assert_eq!(table.pending("ATC_RAT_RLL_P"), 2);

        assert_eq!(table.resolve("ATC_RAT_RLL_P", echo(0.135)), 2);
        assert_eq!(a.try_recv().unwrap(), echo(0.135));
        assert_eq!(b.try_recv().unwrap(), echo(0.135));
        assert!(table.is_empty());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let mut table = WaiterTable::default();
        assert_eq!(table.resolve("NOPE", echo(1.0)), 0);
    }

    #[test]
    fn test_prune_removes_abandoned_waiters() {
        let mut table = WaiterTable::default();
        let rx = table.register("RLL2SRV_P").unwrap();
        let mut live = table.register("RLL2SRV_P").unwrap();
        drop(rx);

        table.prune("RLL2SRV_P");
        assert_eq!(table.pending("RLL2SRV_P"), 1);

        assert_eq!(table.resolve("RLL2SRV_P", echo(2.0)), 1);
        assert_eq!(live.try_recv().unwrap().value, 2.0);
    }

    #[test]
    fn test_prune_last_waiter_removes_entry() {
        let mut table = WaiterTable::default();
        drop(table.register("X").unwrap());
        table.prune("X");
        assert!(table.is_empty());
    }

    #[test]
    fn test_teardown_closes_waiters() {
        let mut state = SharedState::new(1);
        let mut rx = state.waiters.register("THR_MAX").unwrap();
        state.param_sync.begin();

        state.teardown();
        assert!(rx.try_recv().is_err());
        assert!(!state.param_sync.is_downloading());
        assert!(!state.target.is_locked());
    }

    #[test]
    fn test_closed_table_refuses_new_waiters() {
        let mut state = SharedState::new(1);
        state.teardown();
        assert!(state.waiters.register("THR_MAX").is_none());
        assert!(state.waiters.is_empty());
    }
}
