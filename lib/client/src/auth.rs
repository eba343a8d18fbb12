//! Login, logout and profile refresh on top of the request pipeline.

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use opencrm_core::{ApiError, Session, SessionUser};

use crate::client::ApiClient;
use crate::endpoints;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: SessionUser,
}

/// Profile payloads arrive either bare or wrapped in `user`/`data`.
fn decode_user(value: &serde_json::Value) -> Result<SessionUser, ApiError> {
    let candidate = value
        .get("user")
        .or_else(|| value.get("data"))
        .unwrap_or(value);
    serde_json::from_value(candidate.clone()).map_err(|err| ApiError::Decode(err.to_string()))
}

impl ApiClient {
    /// Authenticate and publish the resulting session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let value = self
            .post(endpoints::LOGIN, json!({"email": email, "password": password}))
            .await?;
        let parsed: LoginResponse =
            serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(self.session().login(parsed.user, parsed.token))
    }

    /// End the session. The server call is best effort; local state is
    /// torn down regardless of its outcome.
    pub async fn logout(&self) {
        if let Err(err) = self.post(endpoints::LOGOUT, json!({})).await {
            warn!("logout request failed: {err}");
        }
        self.session().teardown();
    }

    /// Re-fetch the profile and swap it into the session, picking up
    /// permission changes made elsewhere.
    pub async fn refresh_profile(&self) -> Result<SessionUser, ApiError> {
        let value = self.get(endpoints::PROFILE, &[]).await?;
        let user = decode_user(&value)?;
        self.session().update_user(user.clone());
        Ok(user)
    }
}
