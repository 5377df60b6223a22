use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const WALK_COLUMNS: &str =
    "id, client_id, walker_id, dog_name, status, scheduled_at, started_at, ended_at, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl WalkStatus {
    /// Allowed lifecycle transitions. Timestamps are stamped by the handler.
    pub fn can_transition_to(self, next: WalkStatus) -> bool {
        matches!(
            (self, next),
            (WalkStatus::Scheduled, WalkStatus::InProgress)
                | (WalkStatus::Scheduled, WalkStatus::Cancelled)
                | (WalkStatus::InProgress, WalkStatus::Completed)
                | (WalkStatus::InProgress, WalkStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for WalkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WalkStatus::Scheduled => "scheduled",
            WalkStatus::InProgress => "in_progress",
            WalkStatus::Completed => "completed",
            WalkStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WalkStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(WalkStatus::Scheduled),
            "in_progress" => Ok(WalkStatus::InProgress),
            "completed" => Ok(WalkStatus::Completed),
            "cancelled" => Ok(WalkStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Unknown walk status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Walk {
    pub id: Uuid,
    pub client_id: Uuid,
    pub walker_id: Uuid,
    pub dog_name: String,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Walk {
    pub fn status(&self) -> WalkStatus {
        self.status.parse().unwrap_or(WalkStatus::Scheduled)
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.walker_id == user_id
    }
}

/// One point of the walk map location log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalkLocation {
    pub id: Uuid,
    pub walk_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWalkRequest {
    pub walker_id: Option<Uuid>,
    pub dog_name: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWalkStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveLocationRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WalkListQuery {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::WalkStatus::*;

    #[test]
    fn lifecycle_transitions() {
        assert!(Scheduled.can_transition_to(InProgress));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));

        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!Completed.can_transition_to(Cancelled));
    }
}
