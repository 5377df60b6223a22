use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionSettings {
    pub user_id: Uuid,
    pub push_enabled: bool,
    pub email_enabled: bool,
    pub walk_updates: bool,
    pub promotions: bool,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; omitted fields keep their stored (or default) value.
#[derive(Debug, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub push_enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub walk_updates: Option<bool>,
    pub promotions: Option<bool>,
}
