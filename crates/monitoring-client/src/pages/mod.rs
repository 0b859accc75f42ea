//! Page components.
//!
//! Each page owns a clone of the [`ApiClient`] and the data it shows. Every
//! operation that talks to the backend first checks for a session token and
//! fails with [`ClientError::NotAuthenticated`] without one, which the UI
//! turns into a redirect to the login page.

pub mod home;
pub mod login;
pub mod my_requests;
pub mod performance;
pub mod request_editor;
pub mod settings;

use monitoring_api::{ActionResponse, ApiClient};
use tracing::warn;

use crate::error::{ClientError, Result};

pub use home::{HomeFilters, HomePage};
pub use login::LoginPage;
pub use my_requests::MyRequestsPage;
pub use performance::{PerformancePage, PerformanceTotals};
pub use request_editor::{DraftFields, RequestDraft};
pub use settings::SettingsPage;

pub(crate) fn require_session(api: &ApiClient) -> Result<()> {
    if api.session().is_authenticated() {
        Ok(())
    } else {
        Err(ClientError::NotAuthenticated)
    }
}

/// Turn a `success = false` reply into [`ClientError::Rejected`].
pub(crate) fn accepted(action: &str, response: ActionResponse) -> Result<()> {
    match response.rejection() {
        None => Ok(()),
        Some(message) => {
            warn!(action, message = %message, "Server rejected operation");
            Err(ClientError::Rejected(message))
        }
    }
}
