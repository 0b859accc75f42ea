use tracing::{debug, warn};

use monitoring_api::ApiClient;
use monitoring_shared::constants::MIN_USER_SEARCH_CHARS;

use crate::error::{ClientError, Result};
use crate::routes::Route;

pub struct LoginPage {
    api: ApiClient,
    pub user_name: String,
    pub password: String,
    suggestions: Vec<String>,
    error: Option<String>,
}

impl LoginPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            user_name: String::new(),
            password: String::new(),
            suggestions: Vec::new(),
            error: None,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Last failure shown under the form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Refresh the user picker. Short queries clear it without a request.
    pub async fn search_users(&mut self, query: &str) -> Result<&[String]> {
        let query = query.trim();
        if query.chars().count() < MIN_USER_SEARCH_CHARS {
            self.suggestions.clear();
            return Ok(&self.suggestions);
        }

        self.suggestions = self.api.filter_users(query).await?;
        debug!(query, found = self.suggestions.len(), "User search");
        Ok(&self.suggestions)
    }

    pub fn choose_user(&mut self, user_name: &str) {
        self.user_name = user_name.to_string();
        self.suggestions.clear();
    }

    /// Log in with the form contents. The session is persisted by the API
    /// client; the returned route is where to go next.
    pub async fn submit(&mut self) -> Result<Route> {
        if self.user_name.trim().is_empty() || self.password.is_empty() {
            let err = ClientError::Validation("Select a user and enter the password".into());
            self.error = Some(err.user_message());
            return Err(err);
        }

        match self.api.login(self.user_name.trim(), &self.password).await {
            Ok(_) => {
                self.error = None;
                self.password.clear();
                Ok(Route::Home)
            }
            Err(e) => {
                let err = ClientError::from(e);
                warn!(user = %self.user_name, error = %err, "Login failed");
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::backend;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn router() -> Router {
        Router::new()
            .route(
                "/api/Auth/FilterUsers",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let needle = q["query"].to_lowercase();
                    let users: Vec<&str> = ["Иванов", "Иваненко", "Петров"]
                        .into_iter()
                        .filter(|u| u.to_lowercase().starts_with(&needle))
                        .collect();
                    Json(json!(users))
                }),
            )
            .route(
                "/api/Auth/Login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "secret" {
                        Ok(Json(json!({
                            "token": "t.o.k",
                            "userName": body["selectedUser"],
                            "divisionId": 7
                        })))
                    } else {
                        Err((StatusCode::UNAUTHORIZED, "Неверный пароль"))
                    }
                }),
            )
    }

    async fn page() -> LoginPage {
        let api = backend(router()).await;
        api.logout().unwrap();
        LoginPage::new(api)
    }

    #[tokio::test]
    async fn test_search_needs_three_chars() {
        let mut page = page().await;
        assert_eq!(page.search_users("Ива").await.unwrap().len(), 2);

        // shrinking below the threshold clears without asking the server
        assert!(page.search_users("Ив").await.unwrap().is_empty());
        assert!(page.suggestions().is_empty());

        page.search_users("Пет").await.unwrap();
        page.choose_user("Петров");
        assert_eq!(page.user_name, "Петров");
        assert!(page.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_submit_signs_in() {
        let mut page = page().await;
        page.choose_user("Иванов");
        page.password = "secret".into();

        assert_eq!(page.submit().await.unwrap(), Route::Home);
        let session = page.api.session();
        assert_eq!(session.token().as_deref(), Some("t.o.k"));
        assert_eq!(session.division_id(), Some(7));
        assert!(page.password.is_empty());
        assert!(page.error().is_none());
    }

    #[tokio::test]
    async fn test_failures_are_shown() {
        let mut page = page().await;
        page.choose_user("Иванов");
        assert!(matches!(page.submit().await, Err(ClientError::Validation(_))));
        assert!(page.error().is_some());

        page.password = "wrong".into();
        let err = page.submit().await.unwrap_err();
        assert_eq!(page.error(), Some("Неверный пароль"));
        assert_eq!(err.redirect(), Some(Route::Login));
        assert!(!page.api.session().is_authenticated());
    }
}
