use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::Result;
use crate::response::ActionResponse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub can_close_work: bool,
    pub can_send_close_request: bool,
    pub can_access_settings: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subdivision {
    pub id_division: i32,
    pub small_name_division: String,
}

/// Everything the settings screen shows, optionally for one selected user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsData {
    #[serde(default)]
    pub all_users: Vec<String>,
    #[serde(default)]
    pub subdivisions: Vec<Subdivision>,
    #[serde(default)]
    pub selected_user_name: Option<String>,
    #[serde(default)]
    pub current_privacy_settings: Option<PrivacySettings>,
    #[serde(default)]
    pub user_selected_division_ids: Option<Vec<i32>>,
    /// Whether the selected user is active.
    #[serde(default)]
    pub is_user_valid: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsQuery<'a> {
    show_inactive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_user_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavePrivacy<'a> {
    user_name: &'a str,
    #[serde(flatten)]
    privacy: PrivacySettings,
    is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveSubdivisions<'a> {
    user_name: &'a str,
    subdivisions: &'a [i32],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePassword<'a> {
    user_name: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub full_name: String,
    pub small_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_division: Option<i32>,
    pub password: String,
    #[serde(flatten)]
    pub privacy: PrivacySettings,
}

impl ApiClient {
    pub async fn load_settings(
        &self,
        show_inactive: bool,
        selected_user: Option<&str>,
    ) -> Result<SettingsData> {
        self.get_json(
            "/api/Settings",
            &SettingsQuery {
                show_inactive,
                selected_user_name: selected_user,
            },
        )
        .await
    }

    pub async fn save_privacy_settings(
        &self,
        user_name: &str,
        privacy: PrivacySettings,
        is_active: bool,
    ) -> Result<ActionResponse> {
        let resp: ActionResponse = self
            .post_json(
                "/api/Settings/SavePrivacySettings",
                &SavePrivacy {
                    user_name,
                    privacy,
                    is_active,
                },
            )
            .await?;
        info!(user = %user_name, success = resp.success, "Privacy settings saved");
        Ok(resp)
    }

    pub async fn save_subdivisions(
        &self,
        user_name: &str,
        subdivisions: &[i32],
    ) -> Result<ActionResponse> {
        self.post_json(
            "/api/Settings/SaveSubdivisions",
            &SaveSubdivisions {
                user_name,
                subdivisions,
            },
        )
        .await
    }

    pub async fn change_user_password(
        &self,
        user_name: &str,
        new_password: &str,
    ) -> Result<ActionResponse> {
        let resp: ActionResponse = self
            .post_json(
                "/api/Settings/ChangeUserPassword",
                &ChangePassword {
                    user_name,
                    new_password,
                },
            )
            .await?;
        info!(user = %user_name, success = resp.success, "Password change requested");
        Ok(resp)
    }

    pub async fn register_user(&self, request: &RegisterUserRequest) -> Result<ActionResponse> {
        let resp: ActionResponse = self
            .post_json("/api/Settings/RegisterUser", request)
            .await?;
        info!(user = %request.small_name, success = resp.success, "User registration sent");
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{client_for, serve, signed_in};
    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[test]
    fn test_flattened_bodies() {
        let body = serde_json::to_value(SavePrivacy {
            user_name: "ivanov",
            privacy: PrivacySettings {
                can_close_work: true,
                ..PrivacySettings::default()
            },
            is_active: false,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "userName": "ivanov",
                "canCloseWork": true,
                "canSendCloseRequest": false,
                "canAccessSettings": false,
                "isActive": false
            })
        );

        let register = serde_json::to_value(RegisterUserRequest {
            full_name: "Иванов Иван".into(),
            small_name: "ivanov".into(),
            id_division: None,
            password: "p".into(),
            privacy: PrivacySettings::default(),
        })
        .unwrap();
        assert!(register.get("idDivision").is_none());
        assert_eq!(register["canAccessSettings"], false);
    }

    #[tokio::test]
    async fn test_settings_endpoints() {
        let router = Router::new()
            .route(
                "/api/Settings",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "allUsers": ["ivanov", "petrov"],
                        "subdivisions": [{ "idDivision": 3, "smallNameDivision": "ОТК" }],
                        "selectedUserName": q.get("selectedUserName"),
                        "currentPrivacySettings": {
                            "canCloseWork": true,
                            "canSendCloseRequest": true,
                            "canAccessSettings": q["showInactive"] == "true"
                        },
                        "userSelectedDivisionIds": [3],
                        "isUserValid": true
                    }))
                }),
            )
            .route(
                "/api/Settings/SavePrivacySettings",
                post(|| async { Json(json!({ "success": true })) }),
            )
            .route(
                "/api/Settings/SaveSubdivisions",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({ "success": body["subdivisions"] == json!([3, 7]) }))
                }),
            )
            .route(
                "/api/Settings/ChangeUserPassword",
                post(|| async { Json(json!({ "success": false, "message": "Слабый пароль" })) }),
            )
            .route(
                "/api/Settings/RegisterUser",
                post(|| async { Json(json!({ "success": true })) }),
            );
        let base = serve(router).await;
        let client = client_for(&base, signed_in());

        let data = client.load_settings(true, Some("petrov")).await.unwrap();
        assert_eq!(data.all_users.len(), 2);
        assert_eq!(data.selected_user_name.as_deref(), Some("petrov"));
        assert_eq!(data.subdivisions[0].small_name_division, "ОТК");
        assert!(data.current_privacy_settings.unwrap().can_access_settings);

        assert!(client
            .save_privacy_settings("petrov", PrivacySettings::default(), true)
            .await
            .unwrap()
            .success);
        assert!(client.save_subdivisions("petrov", &[3, 7]).await.unwrap().success);
        assert_eq!(
            client
                .change_user_password("petrov", "1")
                .await
                .unwrap()
                .rejection()
                .as_deref(),
            Some("Слабый пароль")
        );
        assert!(client
            .register_user(&RegisterUserRequest::default())
            .await
            .unwrap()
            .success);
    }
}
