//! Resource snapshots and the state sets probes classify them with

use std::fmt;

use stratus_api::{
    DbInstance, DbInstanceStatus, Intake, IntakeRunner, IntakeState, IntakeUser, Network,
    NetworkState, Server, ServerStatus, Volume, VolumeStatus,
};

/// A fetched resource as seen by a lifecycle probe
///
/// Wire models keep every field optional; probes assert presence of the id
/// and the state here, in one place.
pub trait Snapshot: Send {
    type State: PartialEq + fmt::Display + Send + Sync;

    fn id(&self) -> Option<&str>;

    fn state(&self) -> Option<&Self::State>;

    /// Error text the service attaches to a failed resource
    fn failure_detail(&self) -> Option<&str> {
        None
    }
}

impl Snapshot for IntakeRunner {
    type State = IntakeState;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn state(&self) -> Option<&IntakeState> {
        self.state.as_ref()
    }
}

impl Snapshot for Intake {
    type State = IntakeState;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn state(&self) -> Option<&IntakeState> {
        self.state.as_ref()
    }

    fn failure_detail(&self) -> Option<&str> {
        self.failure_message.as_deref()
    }
}

impl Snapshot for IntakeUser {
    type State = IntakeState;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn state(&self) -> Option<&IntakeState> {
        self.state.as_ref()
    }
}

impl Snapshot for Server {
    type State = ServerStatus;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn state(&self) -> Option<&ServerStatus> {
        self.status.as_ref()
    }

    fn failure_detail(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl Snapshot for Volume {
    type State = VolumeStatus;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn state(&self) -> Option<&VolumeStatus> {
        self.status.as_ref()
    }
}

impl Snapshot for Network {
    type State = NetworkState;

    fn id(&self) -> Option<&str> {
        self.network_id.as_deref()
    }

    fn state(&self) -> Option<&NetworkState> {
        self.state.as_ref()
    }
}

impl Snapshot for DbInstance {
    type State = DbInstanceStatus;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn state(&self) -> Option<&DbInstanceStatus> {
        self.status.as_ref()
    }

    fn failure_detail(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Where a state falls for the operation being waited on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    Success,
    Failure,
    Transitional,
}

/// Terminal success and failure states for one (resource, operation) pair
///
/// Passed in per probe, so a service that later grows a failure state only
/// needs a new entry here. A state listed in both sets counts as failure.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSets<S> {
    success: Vec<S>,
    failure: Vec<S>,
}

impl<S: PartialEq> StateSets<S> {
    /// Sets with the given success states and no failure state
    pub fn new(success: impl IntoIterator<Item = S>) -> Self {
        Self {
            success: success.into_iter().collect(),
            failure: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_failure(mut self, failure: impl IntoIterator<Item = S>) -> Self {
        self.failure.extend(failure);
        self
    }

    pub fn classify(&self, state: &S) -> StateClass {
        if self.failure.contains(state) {
            StateClass::Failure
        } else if self.success.contains(state) {
            StateClass::Success
        } else {
            StateClass::Transitional
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let sets = StateSets::new([IntakeState::Active]).with_failure([IntakeState::Failed]);
        assert_eq!(sets.classify(&IntakeState::Active), StateClass::Success);
        assert_eq!(sets.classify(&IntakeState::Failed), StateClass::Failure);
        assert_eq!(
            sets.classify(&IntakeState::Reconciling),
            StateClass::Transitional
        );
        assert_eq!(sets.classify(&IntakeState::Unknown), StateClass::Transitional);
    }

    #[test]
    fn test_failure_wins_a_tie() {
        let sets = StateSets::new([ServerStatus::Error]).with_failure([ServerStatus::Error]);
        assert_eq!(sets.classify(&ServerStatus::Error), StateClass::Failure);
    }

    #[test]
    fn test_network_snapshot_uses_network_id() {
        let network = Network {
            network_id: Some("n-1".to_string()),
            state: Some(NetworkState::Created),
            ..Network::default()
        };
        assert_eq!(network.id(), Some("n-1"));
        assert_eq!(network.state(), Some(&NetworkState::Created));
    }

    #[test]
    fn test_failure_detail() {
        let server = Server {
            error_message: Some("no capacity".to_string()),
            ..Server::default()
        };
        assert_eq!(server.failure_detail(), Some("no capacity"));
        assert_eq!(IntakeRunner::default().failure_detail(), None);
    }
}
