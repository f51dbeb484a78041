//! Account operations. These mutate session state rather than resource
//! state, so they live on [`ApiClient`] directly instead of the
//! [`Gateway`](crate::Gateway) trait.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;

use crate::{client::ApiClient, error::ApiError, session::UserProfile};

impl ApiClient {
    /// POST `accounts/login/`. On success the access/refresh tokens and
    /// the user profile are stored in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let body = json!({ "username": username, "password": password });
        let response = self
            .request(Method::POST, "accounts/login/", Some(&body))
            .await?;
        self.adopt_session(response)
    }

    /// POST `accounts/register/`. Same token handling as login.
    pub async fn register(&self, payload: &Value) -> Result<UserProfile, ApiError> {
        let response = self
            .request(Method::POST, "accounts/register/", Some(payload))
            .await?;
        self.adopt_session(response)
    }

    pub fn logout(&self) {
        self.session().clear();
        info!("session cleared");
    }

    fn adopt_session(&self, response: Value) -> Result<UserProfile, ApiError> {
        let access = response
            .get("access")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Serde("missing access token in response".to_string()))?;
        let refresh = response
            .get("refresh")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Serde("missing refresh token in response".to_string()))?;
        let user: UserProfile = response
            .get("user")
            .cloned()
            .ok_or_else(|| ApiError::Serde("missing user profile in response".to_string()))
            .and_then(|u| {
                serde_json::from_value(u).map_err(|e| ApiError::Serde(e.to_string()))
            })?;

        self.session().set_tokens(access.to_string(), refresh.to_string());
        self.session().set_user(user.clone());
        info!(username = %user.username, "logged in");
        Ok(user)
    }
}
