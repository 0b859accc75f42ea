use tracing::{debug, info};

use monitoring_api::my_requests::{MyRequest, RequestDecision, SetStatusRequest};
use monitoring_api::ApiClient;

use super::{accepted, require_session};
use crate::error::{ClientError, Result};

/// Incoming requests waiting for the current user's decision.
pub struct MyRequestsPage {
    api: ApiClient,
    requests: Vec<MyRequest>,
}

impl MyRequestsPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            requests: Vec::new(),
        }
    }

    pub fn requests(&self) -> &[MyRequest] {
        &self.requests
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.reload().await
    }

    pub async fn reload(&mut self) -> Result<()> {
        require_session(&self.api)?;
        self.requests = self.api.get_my_requests().await?;
        debug!(count = self.requests.len(), "Requests loaded");
        Ok(())
    }

    /// Accept or decline a listed request, then reload the list.
    pub async fn decide(&mut self, request_id: i64, decision: RequestDecision) -> Result<()> {
        require_session(&self.api)?;
        let request = self
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or_else(|| ClientError::Validation(format!("Unknown request {request_id}")))?;

        let body = SetStatusRequest::decide(request, decision);
        let response = self.api.set_request_status(&body).await?;
        accepted("set request status", response)?;
        info!(request_id, decision = ?decision, "Request decided");

        self.reload().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::backend;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn router(decided: Arc<Mutex<Vec<Value>>>) -> Router {
        let listed = decided.clone();
        Router::new()
            .route(
                "/api/MyRequests",
                get(move || {
                    let listed = listed.clone();
                    async move {
                        // requests disappear once decided
                        let done = listed.lock().unwrap().len();
                        let all = [
                            json!({
                                "id": 10, "requestType": "корр2", "proposedDate": "2025-04-01",
                                "workDocumentNumber": "DOC-1", "sender": "Иванов"
                            }),
                            json!({
                                "id": 11, "requestType": "факт", "workDocumentNumber": "DOC-2"
                            }),
                        ];
                        Json(Value::Array(all[done.min(2)..].to_vec()))
                    }
                }),
            )
            .route(
                "/api/MyRequests/SetRequestStatus",
                post(move |Json(body): Json<Value>| {
                    let decided = decided.clone();
                    async move {
                        if body["requestId"] == 11 {
                            return Json(json!({ "success": false, "message": "Нет прав" }));
                        }
                        decided.lock().unwrap().push(body);
                        Json(json!({ "success": true }))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_accept_reloads() {
        let decided = Arc::new(Mutex::new(Vec::new()));
        let mut page = MyRequestsPage::new(backend(router(decided.clone())).await);
        page.mount().await.unwrap();
        assert_eq!(page.requests().len(), 2);

        page.decide(10, RequestDecision::Accepted).await.unwrap();
        assert_eq!(page.requests().len(), 1);

        let body = decided.lock().unwrap()[0].clone();
        assert_eq!(body["newStatus"], "Accepted");
        assert_eq!(body["documentNumber"], "DOC-1");
        assert_eq!(body["requestType"], "корр2");
        assert_eq!(body["proposedDate"], "2025-04-01");
    }

    #[tokio::test]
    async fn test_rejection_keeps_list() {
        let mut page = MyRequestsPage::new(backend(router(Arc::default())).await);
        page.mount().await.unwrap();

        let err = page.decide(11, RequestDecision::Declined).await.unwrap_err();
        assert!(matches!(&err, ClientError::Rejected(m) if m == "Нет прав"));
        assert_eq!(page.requests().len(), 2);

        assert!(matches!(
            page.decide(99, RequestDecision::Declined).await,
            Err(ClientError::Validation(_))
        ));
    }
}
