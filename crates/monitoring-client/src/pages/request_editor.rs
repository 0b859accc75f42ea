//! Creating, editing and withdrawing the current user's own request on a
//! work item.

use chrono::NaiveDate;
use tracing::info;

use monitoring_api::my_requests::{
    CreateWorkRequest, DeleteWorkRequest, RequestType, UpdateWorkRequest,
};
use monitoring_api::work_items::WorkItem;
use monitoring_api::ApiClient;

use super::{accepted, require_session};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftFields {
    pub request_type: RequestType,
    pub proposed_date: Option<NaiveDate>,
    pub receiver: String,
    pub note: String,
}

/// A request being edited. Only a saved request has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDraft {
    New {
        document_number: String,
        fields: DraftFields,
    },
    Existing {
        id: i64,
        document_number: String,
        fields: DraftFields,
    },
}

impl RequestDraft {
    /// Open the editor on `item`: the pending request if the user has one,
    /// otherwise a fresh correction dated `today` addressed to the approver.
    pub fn for_item(item: &WorkItem, today: NaiveDate) -> Self {
        let document_number = item.document_number.clone();
        match item.user_pending_request_id {
            Some(id) => Self::Existing {
                id,
                document_number,
                fields: DraftFields {
                    request_type: item
                        .user_pending_request_type
                        .as_deref()
                        .and_then(RequestType::parse)
                        .unwrap_or_default(),
                    proposed_date: item.user_pending_proposed_date.or(Some(today)),
                    receiver: item
                        .user_pending_receiver
                        .clone()
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| item.approver.clone()),
                    note: item.user_pending_request_note.clone().unwrap_or_default(),
                },
            },
            None => Self::New {
                document_number,
                fields: DraftFields {
                    request_type: RequestType::default(),
                    proposed_date: Some(today),
                    receiver: item.approver.clone(),
                    note: String::new(),
                },
            },
        }
    }

    pub fn document_number(&self) -> &str {
        match self {
            Self::New {
                document_number, ..
            }
            | Self::Existing {
                document_number, ..
            } => document_number,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::New { .. } => None,
            Self::Existing { id, .. } => Some(*id),
        }
    }

    pub fn fields(&self) -> &DraftFields {
        match self {
            Self::New { fields, .. } | Self::Existing { fields, .. } => fields,
        }
    }

    pub fn fields_mut(&mut self) -> &mut DraftFields {
        match self {
            Self::New { fields, .. } | Self::Existing { fields, .. } => fields,
        }
    }

    /// Create or update the request. A newly created draft becomes
    /// `Existing` when the server returns its id.
    pub async fn save(&mut self, api: &ApiClient) -> Result<()> {
        require_session(api)?;
        let fields = self.fields().clone();
        if fields.receiver.trim().is_empty() {
            return Err(ClientError::Validation("Receiver is required".into()));
        }

        let document_number = self.document_number().to_string();
        match self.id() {
            None => {
                let body = CreateWorkRequest {
                    document_number,
                    request_type: fields.request_type,
                    proposed_date: fields.proposed_date,
                    note: fields.note.clone(),
                    receiver: fields.receiver.clone(),
                };
                let (response, request_id) = api.create_work_request(&body).await?.into_action();
                accepted("create request", response)?;

                if let Some(id) = request_id {
                    *self = Self::Existing {
                        id,
                        document_number: body.document_number,
                        fields,
                    };
                }
            }
            Some(id) => {
                let body = UpdateWorkRequest {
                    id,
                    document_number,
                    request_type: fields.request_type,
                    proposed_date: fields.proposed_date,
                    receiver: fields.receiver,
                    note: fields.note,
                };
                accepted("update request", api.update_work_request(&body).await?)?;
                info!(request_id = id, "Request updated");
            }
        }
        Ok(())
    }

    /// Withdraw a saved request.
    pub async fn delete(&self, api: &ApiClient) -> Result<()> {
        require_session(api)?;
        let Self::Existing {
            id,
            document_number,
            ..
        } = self
        else {
            return Err(ClientError::Validation(
                "Only a saved request can be deleted".into(),
            ));
        };

        let body = DeleteWorkRequest {
            request_id: *id,
            document_number: document_number.clone(),
        };
        accepted("delete request", api.delete_work_request(&body).await?)?;
        info!(request_id = *id, "Request deleted");
        Ok(())
    }
}
