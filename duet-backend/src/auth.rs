use serde::{Deserialize, Serialize};

use crate::{Client, ClientResult};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,
    /// The user's email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The tokens returned after a successful sign-in or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The bearer token for authorized requests
    pub access_token: String,
    /// The token type; always `bearer`
    pub token_type: String,
    /// Seconds until `access_token` expires
    pub expires_in: u64,
    /// Unix timestamp at which `access_token` expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// The token used to obtain a new session
    pub refresh_token: String,
    /// The signed-in user
    pub user: User,
}

/// Auth endpoints.
impl Client {
    /// Sign in with an email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthSession> {
        #[derive(Serialize)]
        struct PasswordGrant<'a> {
            email: &'a str,
            password: &'a str,
        }

        let session: AuthSession = self
            .token_grant("password", &PasswordGrant { email, password })
            .await?;
        tracing::info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> ClientResult<AuthSession> {
        #[derive(Serialize)]
        struct RefreshGrant<'a> {
            refresh_token: &'a str,
        }

        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    /// Get the user owning `access_token`. Fails if the token is no longer valid.
    pub async fn get_user(&self, access_token: &str) -> ClientResult<User> {
        let request = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token);
        self.send(request).await
    }

    /// Revoke the session owning `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        let request = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token);
        self.send::<()>(request).await?;
        tracing::info!("signed out");
        Ok(())
    }

    async fn token_grant<T: Serialize>(&self, grant_type: &str, body: &T) -> ClientResult<AuthSession> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.api_key)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(body)?);
        self.send(request).await
    }
}
