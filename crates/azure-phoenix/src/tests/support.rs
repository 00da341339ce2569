//! Test support for dispatcher coverage.
//!
//! Supplies an in-memory liveness tracker, resource configurations, and the
//! behavioural test world so step definitions and unit tests stay focused on
//! their assertions.

use std::cell::RefCell;
use std::path::PathBuf;

use phoenix_config::ResourceConfig;
use rstest::fixture;

use crate::liveness::{Liveness, LivenessTracker, TrackerError};
use crate::ocf::OcfStatus;
use crate::power::{MockPowerController, PowerError};
use crate::{ActionRequest, Dispatcher};

/// Pid the fake tracker hands out for new watchers.
pub(super) const WATCHER_PID: u32 = 4242;

/// A recorded tracker operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TrackerCall {
    Query,
    Create,
    Spawn,
    Record(u32),
    Delete,
}

/// In-memory tracker recording every call.
#[derive(Debug, Default)]
pub(super) struct FakeTracker {
    pub running: bool,
    pub record_exists: bool,
    pub pid: Option<u32>,
    pub survives_delete: bool,
    pub calls: Vec<TrackerCall>,
}

impl FakeTracker {
    /// A tracker whose watcher is alive with a record on disk.
    pub fn running() -> Self {
        Self {
            running: true,
            record_exists: true,
            pid: Some(WATCHER_PID),
            ..Self::default()
        }
    }

    /// Calls other than liveness queries.
    pub fn mutations(&self) -> Vec<TrackerCall> {
        self.calls
            .iter()
            .copied()
            .filter(|call| *call != TrackerCall::Query)
            .collect()
    }
}

impl LivenessTracker for FakeTracker {
    fn query(&mut self) -> Liveness {
        self.calls.push(TrackerCall::Query);
        if self.running {
            Liveness::Running
        } else {
            Liveness::NotRunning
        }
    }

    fn create(&mut self) -> Result<(), TrackerError> {
        self.calls.push(TrackerCall::Create);
        self.record_exists = true;
        self.pid = None;
        Ok(())
    }

    fn spawn_watcher(&mut self) -> Result<u32, TrackerError> {
        self.calls.push(TrackerCall::Spawn);
        Ok(WATCHER_PID)
    }

    fn record(&mut self, pid: u32) -> Result<(), TrackerError> {
        self.calls.push(TrackerCall::Record(pid));
        self.pid = Some(pid);
        self.running = true;
        Ok(())
    }

    fn delete(&mut self) -> Result<(), TrackerError> {
        self.calls.push(TrackerCall::Delete);
        if !self.record_exists {
            return Err(TrackerError::Missing {
                path: PathBuf::from("/run/azure-phoenix-test.pid"),
            });
        }
        self.record_exists = false;
        self.pid = None;
        self.running = self.survives_delete;
        Ok(())
    }
}

/// A complete managed identity configuration.
pub(super) fn valid_config() -> ResourceConfig {
    ResourceConfig {
        resource_group: Some(String::from("rg-cluster")),
        vm_name: Some(String::from("node-2")),
        subscription_id: Some(String::from("sub-1")),
        use_msi: Some(String::from("true")),
        ..ResourceConfig::default()
    }
}

/// An API failure as the fence agent reports it.
pub(super) fn api_failure(action: &'static str) -> PowerError {
    PowerError::Api {
        action,
        status: Some(1),
        message: String::from("AuthorizationFailed"),
    }
}

/// Behavioural test world.
pub(super) struct TestWorld {
    pub tracker: FakeTracker,
    pub power: MockPowerController,
    pub config: ResourceConfig,
    pub stdout: Vec<u8>,
    pub status: Option<OcfStatus>,
    pub tracker_after: Option<FakeTracker>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            tracker: FakeTracker::default(),
            power: MockPowerController::new(),
            config: valid_config(),
            stdout: Vec::new(),
            status: None,
            tracker_after: None,
        }
    }
}

impl TestWorld {
    /// Runs `action` once, consuming the prepared tracker and controller.
    pub fn run(&mut self, action: &str) {
        let tracker = std::mem::take(&mut self.tracker);
        let power = std::mem::replace(&mut self.power, MockPowerController::new());
        let mut dispatcher = Dispatcher::new(tracker, power);
        let request = ActionRequest::parse(Some(action));
        self.status = Some(dispatcher.dispatch(&request, &self.config, &mut self.stdout));
        let (tracker, _power) = dispatcher.into_parts();
        self.tracker_after = Some(tracker);
    }

    /// Tracker state after the last run.
    pub fn tracker_after(&self) -> &FakeTracker {
        self.tracker_after
            .as_ref()
            .expect("an action should have run")
    }

    /// Captured stdout.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
