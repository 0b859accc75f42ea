use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::dates;
use crate::error::Result;

/// A tracked work item with its planned and corrected dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub document_number: String,
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub work_name: String,
    #[serde(default)]
    pub executor: String,
    #[serde(default)]
    pub controller: String,
    #[serde(default)]
    pub approver: String,
    #[serde(default, with = "dates::optional")]
    pub plan_date: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub korrect1: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub korrect2: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub korrect3: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub fact_date: Option<NaiveDate>,
    #[serde(default)]
    pub highlight_css_class: Option<String>,

    // The current user's own open request on this item, if any.
    #[serde(default)]
    pub user_pending_request_id: Option<i64>,
    #[serde(default)]
    pub user_pending_request_type: Option<String>,
    #[serde(default, with = "dates::optional")]
    pub user_pending_proposed_date: Option<NaiveDate>,
    #[serde(default)]
    pub user_pending_request_note: Option<String>,
    #[serde(default)]
    pub user_pending_receiver: Option<String>,
}

impl WorkItem {
    /// The date currently in force: the latest correction, else the plan.
    pub fn effective_deadline(&self) -> Option<NaiveDate> {
        self.korrect3
            .or(self.korrect2)
            .or(self.korrect1)
            .or(self.plan_date)
    }

    pub fn is_closed(&self) -> bool {
        self.fact_date.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedWorkItems {
    #[serde(default)]
    pub items: Vec<WorkItem>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// Work item filters. Unset fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemQuery {
    #[serde(skip_serializing_if = "Option::is_none", with = "dates::optional")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", with = "dates::optional")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Excel,
    Pdf,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(flatten)]
    pub filters: WorkItemQuery,
}

impl ApiClient {
    pub async fn get_filtered_work_items(&self, query: &WorkItemQuery) -> Result<PagedWorkItems> {
        self.get_json("/api/WorkItems", query).await
    }

    /// Divisions the current user may view.
    pub async fn get_allowed_divisions(&self) -> Result<Vec<i32>> {
        self.get_json("/api/WorkItems/AllowedDivisions", &()).await
    }

    pub async fn get_executors(&self, division_id: i32) -> Result<Vec<String>> {
        self.get_json("/api/WorkItems/Executors", &[("divisionId", division_id)])
            .await
    }

    pub async fn get_approvers(&self, division_id: i32) -> Result<Vec<String>> {
        self.get_json("/api/WorkItems/Approvers", &[("divisionId", division_id)])
            .await
    }

    pub async fn get_division_name(&self, division_id: i32) -> Result<String> {
        self.get_text("/api/WorkItems/DivisionName", &[("divisionId", division_id)])
            .await
    }

    pub async fn clear_work_items_cache(&self, division_id: i32) -> Result<()> {
        self.post_empty("/api/WorkItems/ClearCache", &[("divisionId", division_id)])
            .await?;
        info!(division = division_id, "Work item cache cleared");
        Ok(())
    }

    /// The server-rendered export file.
    pub async fn export_work_items(&self, request: &ExportRequest) -> Result<Bytes> {
        let file = self.post_bytes("/api/WorkItems/Export", request).await?;
        info!(format = ?request.format, len = file.len(), "Work items exported");
        Ok(file)
    }
}
