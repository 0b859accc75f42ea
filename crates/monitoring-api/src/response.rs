use serde::{Deserialize, Serialize};

/// Reply of the backend's mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResponse {
    /// The server's reason when it refused the action.
    pub fn rejection(&self) -> Option<String> {
        (!self.success).then(|| {
            self.message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Operation rejected by server".to_string())
        })
    }
}
