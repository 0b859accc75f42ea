use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::dates;
use crate::error::Result;
use crate::response::ActionResponse;

/// Kind of change a request asks for: closing the work item, or one of
/// three deadline corrections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "факт")]
    Fact,
    #[default]
    #[serde(rename = "корр1")]
    Correction1,
    #[serde(rename = "корр2")]
    Correction2,
    #[serde(rename = "корр3")]
    Correction3,
    /// Anything the backend sends that this client does not know.
    #[serde(other)]
    Unknown,
}

impl RequestType {
    pub const ALL: [RequestType; 4] = [
        RequestType::Correction1,
        RequestType::Correction2,
        RequestType::Correction3,
        RequestType::Fact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fact => "факт",
            Self::Correction1 => "корр1",
            Self::Correction2 => "корр2",
            Self::Correction3 => "корр3",
            Self::Unknown => "",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestDecision {
    Accepted,
    Declined,
}

/// An incoming request addressed to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRequest {
    pub id: i64,
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub work_name: String,
    #[serde(default)]
    pub executor: String,
    #[serde(default)]
    pub controller: String,
    #[serde(default)]
    pub receiver: String,
    #[serde(default, with = "dates::optional")]
    pub plan_date: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub korrect1: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub korrect2: Option<NaiveDate>,
    #[serde(default, with = "dates::optional")]
    pub korrect3: Option<NaiveDate>,
    pub request_type: RequestType,
    #[serde(default, with = "dates::optional")]
    pub proposed_date: Option<NaiveDate>,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub work_document_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub request_id: i64,
    pub document_number: String,
    pub new_status: RequestDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_type: Option<RequestType>,
    #[serde(skip_serializing_if = "Option::is_none", with = "dates::optional")]
    pub proposed_date: Option<NaiveDate>,
}

impl SetStatusRequest {
    /// Decide on an incoming request, echoing its type and date back.
    pub fn decide(request: &MyRequest, decision: RequestDecision) -> Self {
        Self {
            request_id: request.id,
            document_number: request.work_document_number.clone(),
            new_status: decision,
            request_type: Some(request.request_type).filter(|t| *t != RequestType::Unknown),
            proposed_date: request.proposed_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkRequest {
    pub document_number: String,
    pub request_type: RequestType,
    #[serde(with = "dates::optional")]
    pub proposed_date: Option<NaiveDate>,
    pub note: String,
    pub receiver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkRequest {
    pub id: i64,
    pub document_number: String,
    pub request_type: RequestType,
    #[serde(with = "dates::optional")]
    pub proposed_date: Option<NaiveDate>,
    pub receiver: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteWorkRequest {
    pub request_id: i64,
    pub document_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<i64>,
}

impl CreateRequestResponse {
    pub fn into_action(self) -> (ActionResponse, Option<i64>) {
        (
            ActionResponse {
                success: self.success,
                message: self.message,
            },
            self.request_id,
        )
    }
}

impl ApiClient {
    pub async fn get_my_requests(&self) -> Result<Vec<MyRequest>> {
        self.get_json("/api/MyRequests", &()).await
    }

    pub async fn set_request_status(&self, request: &SetStatusRequest) -> Result<ActionResponse> {
        let resp: ActionResponse = self
            .post_json("/api/MyRequests/SetRequestStatus", request)
            .await?;
        info!(
            request_id = request.request_id,
            decision = ?request.new_status,
            success = resp.success,
            "Request status set"
        );
        Ok(resp)
    }

    pub async fn create_work_request(
        &self,
        request: &CreateWorkRequest,
    ) -> Result<CreateRequestResponse> {
        let resp: CreateRequestResponse =
            self.post_json("/api/MyRequests/Create", request).await?;
        info!(
            document = %request.document_number,
            request_id = ?resp.request_id,
            success = resp.success,
            "Work request created"
        );
        Ok(resp)
    }

    pub async fn update_work_request(&self, request: &UpdateWorkRequest) -> Result<ActionResponse> {
        self.post_json("/api/MyRequests/Update", request).await
    }

    pub async fn delete_work_request(&self, request: &DeleteWorkRequest) -> Result<ActionResponse> {
        self.post_json("/api/MyRequests/Delete", request).await
    }
}
