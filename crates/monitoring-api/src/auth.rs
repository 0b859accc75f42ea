use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    selected_user: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_name: String,
    #[serde(default)]
    pub division_id: Option<i32>,
}

impl ApiClient {
    /// Authenticate and store the returned credentials in the session.
    pub async fn login(&self, user: &str, password: &str) -> Result<LoginResponse> {
        let resp: LoginResponse = self
            .post_json(
                "/api/Auth/Login",
                &LoginRequest {
                    selected_user: user,
                    password,
                },
            )
            .await?;

        self.session()
            .sign_in(&resp.token, &resp.user_name, resp.division_id)?;
        info!(user = %resp.user_name, division = ?resp.division_id, "Logged in");
        Ok(resp)
    }

    /// Drop the stored credentials. There is no server call.
    pub fn logout(&self) -> Result<()> {
        self.session().sign_out()?;
        Ok(())
    }

    /// User names matching `query`, for the login picker.
    pub async fn filter_users(&self, query: &str) -> Result<Vec<String>> {
        self.get_json("/api/Auth/FilterUsers", &[("query", query)])
            .await
    }
}
