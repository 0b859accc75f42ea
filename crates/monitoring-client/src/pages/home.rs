//! The work item dashboard.
//!
//! Shows one division at a time. The division defaults to the last one the
//! user picked, as long as it is still allowed. Filters and the page number
//! translate directly into a [`WorkItemQuery`].

use bytes::Bytes;
use chrono::NaiveDate;
use tracing::{debug, info};

use monitoring_api::notifications::Notification;
use monitoring_api::work_items::{ExportFormat, ExportRequest, PagedWorkItems, WorkItemQuery};
use monitoring_api::ApiClient;

use super::require_session;
use crate::error::{ClientError, Result};
use crate::routes::Route;

/// User-editable filters. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub executor: String,
    pub approver: String,
    pub search: String,
}

pub struct HomePage {
    api: ApiClient,
    page_size: u32,

    divisions: Vec<i32>,
    division: Option<i32>,
    division_name: String,
    executors: Vec<String>,
    approvers: Vec<String>,
    notifications: Vec<Notification>,

    filters: HomeFilters,
    page_number: u32,
    items: Option<PagedWorkItems>,
}

/// The stored division if it is still allowed, else the first allowed one.
pub fn default_division(allowed: &[i32], stored: Option<i32>) -> Option<i32> {
    stored
        .filter(|id| allowed.contains(id))
        .or_else(|| allowed.first().copied())
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl HomePage {
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            divisions: Vec::new(),
            division: None,
            division_name: String::new(),
            executors: Vec::new(),
            approvers: Vec::new(),
            notifications: Vec::new(),
            filters: HomeFilters::default(),
            page_number: 1,
            items: None,
        }
    }

    pub fn divisions(&self) -> &[i32] {
        &self.divisions
    }

    pub fn division(&self) -> Option<i32> {
        self.division
    }

    pub fn division_name(&self) -> &str {
        &self.division_name
    }

    pub fn executors(&self) -> &[String] {
        &self.executors
    }

    pub fn approvers(&self) -> &[String] {
        &self.approvers
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn filters(&self) -> &HomeFilters {
        &self.filters
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn items(&self) -> Option<&PagedWorkItems> {
        self.items.as_ref()
    }

    pub async fn mount(&mut self) -> Result<()> {
        require_session(&self.api)?;

        self.divisions = self.api.get_allowed_divisions().await?;
        let stored = self.api.session().division_id();
        match default_division(&self.divisions, stored) {
            Some(division) => self.load_division(division).await,
            None => {
                info!("No divisions available to this user");
                self.division = None;
                self.items = None;
                Ok(())
            }
        }
    }

    /// Switch division and remember it as the last used one.
    pub async fn select_division(&mut self, division: i32) -> Result<()> {
        require_session(&self.api)?;
        if !self.divisions.contains(&division) {
            return Err(ClientError::Validation(format!(
                "Division {division} is not available"
            )));
        }
        self.api.session().set_division(division)?;
        self.load_division(division).await
    }

    /// Replace the filters and reload from the first page.
    pub async fn set_filters(&mut self, filters: HomeFilters) -> Result<()> {
        self.filters = filters;
        self.page_number = 1;
        self.reload().await
    }

    pub async fn go_to_page(&mut self, page_number: u32) -> Result<()> {
        let last = self.items.as_ref().map_or(1, |p| p.total_pages.max(1));
        self.page_number = page_number.clamp(1, last);
        self.reload().await
    }

    /// Fetch the current page of work items for the current filters.
    pub async fn reload(&mut self) -> Result<()> {
        require_session(&self.api)?;
        if self.division.is_none() {
            return Ok(());
        }
        let page = self.api.get_filtered_work_items(&self.query()).await?;
        debug!(
            page = page.current_page,
            total = page.total_count,
            "Work items loaded"
        );
        self.items = Some(page);
        Ok(())
    }

    /// Drop the server-side cache for this division and reload.
    pub async fn clear_cache(&mut self) -> Result<()> {
        require_session(&self.api)?;
        let division = self.require_division()?;
        self.api.clear_work_items_cache(division).await?;
        self.reload().await
    }

    /// Export what the current filters select.
    pub async fn export(&self, format: ExportFormat) -> Result<Bytes> {
        require_session(&self.api)?;
        self.require_division()?;
        let request = ExportRequest {
            format,
            filters: WorkItemQuery {
                page_number: None,
                page_size: None,
                ..self.query()
            },
        };
        Ok(self.api.export_work_items(&request).await?)
    }

    pub fn logout(&self) -> Result<Route> {
        self.api.logout()?;
        Ok(Route::Login)
    }

    fn require_division(&self) -> Result<i32> {
        self.division
            .ok_or_else(|| ClientError::Validation("No division selected".into()))
    }

    fn query(&self) -> WorkItemQuery {
        WorkItemQuery {
            start_date: self.filters.start_date,
            end_date: self.filters.end_date,
            executor: non_blank(&self.filters.executor),
            approver: non_blank(&self.filters.approver),
            search: non_blank(&self.filters.search),
            division_id: self.division,
            page_number: Some(self.page_number),
            page_size: Some(self.page_size),
        }
    }

    async fn load_division(&mut self, division: i32) -> Result<()> {
        self.division = Some(division);
        self.page_number = 1;

        self.division_name = self.api.get_division_name(division).await?;
        self.executors = self.api.get_executors(division).await?;
        self.approvers = self.api.get_approvers(division).await?;
        self.notifications = self.api.get_active_notifications(division).await?;
        info!(division, name = %self.division_name, "Division loaded");

        self.reload().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::backend;
    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<HashMap<String, String>>>>;

    fn router(queries: Log, exports: Arc<Mutex<Vec<Value>>>) -> Router {
        Router::new()
            .route("/api/WorkItems/AllowedDivisions", get(|| async { Json(json!([3, 5])) }))
            .route(
                "/api/WorkItems/DivisionName",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    format!("Отдел {}", q["divisionId"])
                }),
            )
            .route("/api/WorkItems/Executors", get(|| async { Json(json!(["Сидоров"])) }))
            .route("/api/WorkItems/Approvers", get(|| async { Json(json!(["Кузнецов"])) }))
            .route(
                "/api/Notifications",
                get(|| async {
                    Json(json!([{
                        "id": 1,
                        "title": "Сдача отчётов",
                        "dateSetInSystem": "2025-03-01T09:00:00",
                        "userName": "admin",
                        "isActive": true
                    }]))
                }),
            )
            .route(
                "/api/WorkItems",
                get(move |Query(q): Query<HashMap<String, String>>| {
                    let queries = queries.clone();
                    async move {
                        let page: u32 = q["pageNumber"].parse().unwrap();
                        queries.lock().unwrap().push(q);
                        Json(json!({
                            "items": [{ "documentNumber": format!("DOC-{page}") }],
                            "currentPage": page,
                            "pageSize": 20,
                            "totalPages": 3,
                            "totalCount": 45
                        }))
                    }
                }),
            )
            .route("/api/WorkItems/ClearCache", post(|| async {}))
            .route(
                "/api/WorkItems/Export",
                post(move |Json(body): Json<Value>| {
                    let exports = exports.clone();
                    async move {
                        exports.lock().unwrap().push(body);
                        vec![0x50u8, 0x4b, 0x03, 0x04]
                    }
                }),
            )
    }

    async fn mounted(stored: Option<i32>) -> (HomePage, Log, Arc<Mutex<Vec<Value>>>) {
        let queries: Log = Arc::default();
        let exports = Arc::default();
        let api = backend(router(queries.clone(), Arc::clone(&exports))).await;
        if let Some(division) = stored {
            api.session().set_division(division).unwrap();
        }
        let mut page = HomePage::new(api, 20);
        page.mount().await.unwrap();
        (page, queries, exports)
    }

    #[test]
    fn test_default_division() {
        assert_eq!(default_division(&[3, 5], Some(5)), Some(5));
        assert_eq!(default_division(&[3, 5], Some(9)), Some(3));
        assert_eq!(default_division(&[3, 5], None), Some(3));
        assert_eq!(default_division(&[], Some(5)), None);
    }

    #[tokio::test]
    async fn test_mount_loads_stored_division() {
        let (page, queries, _) = mounted(Some(5)).await;

        assert_eq!(page.division(), Some(5));
        assert_eq!(page.division_name(), "Отдел 5");
        assert_eq!(page.executors(), ["Сидоров"]);
        assert_eq!(page.approvers(), ["Кузнецов"]);
        assert_eq!(page.notifications().len(), 1);
        assert_eq!(page.items().unwrap().items[0].document_number, "DOC-1");

        let q = &queries.lock().unwrap()[0];
        assert_eq!(q["divisionId"], "5");
        assert_eq!(q["pageSize"], "20");
        assert!(!q.contains_key("executor"));
    }

    #[tokio::test]
    async fn test_filter_change_resets_page() {
        let (mut page, queries, _) = mounted(None).await;
        assert_eq!(page.division(), Some(3));

        page.go_to_page(3).await.unwrap();
        assert_eq!(page.page_number(), 3);
        page.go_to_page(99).await.unwrap();
        assert_eq!(page.page_number(), 3);

        page.set_filters(HomeFilters {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            executor: "Сидоров".into(),
            search: "  ".into(),
            ..HomeFilters::default()
        })
        .await
        .unwrap();
        assert_eq!(page.page_number(), 1);

        let last = queries.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last["pageNumber"], "1");
        assert_eq!(last["startDate"], "2025-01-01");
        assert_eq!(last["executor"], "Сидоров");
        assert!(!last.contains_key("search"));
    }

    #[tokio::test]
    async fn test_division_choice_is_remembered() {
        let (mut page, _, _) = mounted(None).await;
        page.select_division(5).await.unwrap();
        assert_eq!(page.api.session().division_id(), Some(5));

        assert!(matches!(
            page.select_division(8).await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(page.division(), Some(5));
    }

    #[tokio::test]
    async fn test_export_uses_filters_without_paging() {
        let (mut page, _, exports) = mounted(None).await;
        page.set_filters(HomeFilters {
            approver: "Кузнецов".into(),
            ..HomeFilters::default()
        })
        .await
        .unwrap();
        page.clear_cache().await.unwrap();

        let file = page.export(ExportFormat::Csv).await.unwrap();
        assert_eq!(&file[..2], b"PK");

        let body = exports.lock().unwrap()[0].clone();
        assert_eq!(body["format"], "csv");
        assert_eq!(body["approver"], "Кузнецов");
        assert_eq!(body["divisionId"], 3);
        assert!(body.get("pageNumber").is_none());
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (mut page, _, _) = mounted(None).await;
        assert_eq!(page.logout().unwrap(), Route::Login);

        let err = page.reload().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(err.redirect(), Some(Route::Login));
    }
}
