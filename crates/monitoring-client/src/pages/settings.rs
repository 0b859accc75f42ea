//! User administration: privacy flags, visible subdivisions, passwords and
//! registration of new users.

use tracing::{debug, info};

use monitoring_api::settings::{PrivacySettings, RegisterUserRequest, SettingsData};
use monitoring_api::ApiClient;

use super::{accepted, require_session};
use crate::error::{ClientError, Result};

pub struct SettingsPage {
    api: ApiClient,
    data: Option<SettingsData>,
    show_inactive: bool,
    selected_user: Option<String>,

    // edits for the selected user
    pub privacy: PrivacySettings,
    pub is_active: bool,
    pub new_password: String,
    subdivisions: Vec<i32>,
}

impl SettingsPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            data: None,
            show_inactive: false,
            selected_user: None,
            privacy: PrivacySettings::default(),
            is_active: true,
            new_password: String::new(),
            subdivisions: Vec::new(),
        }
    }

    pub fn data(&self) -> Option<&SettingsData> {
        self.data.as_ref()
    }

    pub fn show_inactive(&self) -> bool {
        self.show_inactive
    }

    pub fn selected_user(&self) -> Option<&str> {
        self.selected_user.as_deref()
    }

    pub fn subdivisions(&self) -> &[i32] {
        &self.subdivisions
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.reload().await
    }

    pub async fn set_show_inactive(&mut self, show_inactive: bool) -> Result<()> {
        self.show_inactive = show_inactive;
        self.reload().await
    }

    /// Load the settings of `user_name` into the editor.
    pub async fn select_user(&mut self, user_name: &str) -> Result<()> {
        self.selected_user = Some(user_name.to_string());
        self.reload().await
    }

    /// Flip one subdivision. Returns whether it is now selected.
    pub fn toggle_subdivision(&mut self, id: i32) -> bool {
        if let Some(pos) = self.subdivisions.iter().position(|s| *s == id) {
            self.subdivisions.remove(pos);
            false
        } else {
            self.subdivisions.push(id);
            true
        }
    }

    pub async fn reload(&mut self) -> Result<()> {
        require_session(&self.api)?;
        let data = self
            .api
            .load_settings(self.show_inactive, self.selected_user.as_deref())
            .await?;

        if let Some(user) = &data.selected_user_name {
            self.selected_user = Some(user.clone());
        }
        if let Some(privacy) = data.current_privacy_settings {
            self.privacy = privacy;
        }
        if let Some(valid) = data.is_user_valid {
            self.is_active = valid;
        }
        if let Some(ids) = &data.user_selected_division_ids {
            self.subdivisions = ids.clone();
        }
        debug!(
            users = data.all_users.len(),
            selected = ?self.selected_user,
            "Settings loaded"
        );
        self.data = Some(data);
        Ok(())
    }

    /// Save privacy, then subdivisions, then the password if one was typed.
    /// Stops at the first step the server refuses.
    pub async fn save(&mut self) -> Result<()> {
        require_session(&self.api)?;
        let user = self
            .selected_user
            .clone()
            .ok_or_else(|| ClientError::Validation("Select a user first".into()))?;

        let response = self
            .api
            .save_privacy_settings(&user, self.privacy, self.is_active)
            .await?;
        accepted("save privacy settings", response)?;

        let response = self.api.save_subdivisions(&user, &self.subdivisions).await?;
        accepted("save subdivisions", response)?;

        let password = self.new_password.trim();
        if !password.is_empty() {
            let response = self.api.change_user_password(&user, password).await?;
            accepted("change password", response)?;
        }

        info!(user = %user, "Settings saved");
        self.new_password.clear();
        self.reload().await
    }

    pub async fn register(&mut self, request: &RegisterUserRequest) -> Result<()> {
        require_session(&self.api)?;
        if request.full_name.trim().is_empty()
            || request.small_name.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(ClientError::Validation(
                "Full name, short name and password are required".into(),
            ));
        }

        accepted("register user", self.api.register_user(request).await?)?;
        self.reload().await
    }
}
