//! Intake service types (runners, intakes and intake users)

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state shared by intake runners, intakes and intake users
///
/// Only intakes ever report `Failed`; runners and users have no terminal
/// failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeState {
    Reconciling,
    Active,
    Deleting,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for IntakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reconciling => "RECONCILING",
            Self::Active => "ACTIVE",
            Self::Deleting => "DELETING",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Intake runner as returned by `GET .../intake-runners/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRunner {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub state: Option<IntakeState>,
    pub max_message_size_ki_b: Option<i64>,
    pub max_messages_per_hour: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub create_time: Option<DateTime<Utc>>,
}

/// Intake as returned by `GET .../intakes/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intake {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub intake_runner_id: Option<String>,
    pub state: Option<IntakeState>,
    pub uri: Option<String>,
    pub failure_message: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
}

/// Intake user as returned by `GET .../intakes/{intake}/users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeUser {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub state: Option<IntakeState>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
}
