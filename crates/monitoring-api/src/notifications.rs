use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use monitoring_shared::protocol::timestamp;

use crate::client::ApiClient;
use crate::error::Result;

/// A notice shown to everyone in a division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    #[serde(with = "timestamp")]
    pub date_set_in_system: DateTime<Utc>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub is_active: bool,
}

impl ApiClient {
    pub async fn get_active_notifications(&self, division_id: i32) -> Result<Vec<Notification>> {
        self.get_json("/api/Notifications", &[("divisionId", division_id)])
            .await
    }

    /// Deactivate notifications older than `days`.
    pub async fn deactivate_old_notifications(&self, days: u32) -> Result<()> {
        self.post_empty("/api/Notifications/DeactivateOld", &[("days", days)])
            .await?;
        info!(days, "Old notifications deactivated");
        Ok(())
    }
}
