use tokio::sync::watch;

use crate::db::{self, ClientResult};

/// Whether an admin is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn { session: db::AuthSession },
}
impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn { .. })
    }

    pub fn user(&self) -> Option<&db::User> {
        match self {
            AuthState::SignedOut => None,
            AuthState::SignedIn { session } => Some(&session.user),
        }
    }
}

/// The process-wide auth context.
///
/// Created once at startup from the anonymous client and handed to whatever
/// needs the backend. Consumers either read [`Session::current`] or keep a
/// [`Session::subscribe`] receiver to be told about sign-in and sign-out.
#[derive(Debug)]
pub struct Session {
    client: db::Client,
    state: watch::Sender<AuthState>,
}
impl Session {
    pub fn start(client: db::Client) -> Self {
        let client = client.anonymous();
        tracing::info!(base_url = client.base_url(), "session started");
        Self {
            client,
            state: watch::Sender::new(AuthState::SignedOut),
        }
    }

    /// Resumes a previously-issued session, refreshing it if the access token
    /// is no longer accepted. Falls back to signed-out if neither works.
    pub async fn restore(&self, session: db::AuthSession) -> ClientResult<db::User> {
        match self.client.get_user(&session.access_token).await {
            Ok(user) => {
                self.set(AuthState::SignedIn {
                    session: db::AuthSession {
                        user: user.clone(),
                        ..session
                    },
                });
                Ok(user)
            }
            Err(e) => {
                tracing::info!("stored access token rejected ({e}), refreshing");
                match self.client.refresh_session(&session.refresh_token).await {
                    Ok(session) => {
                        let user = session.user.clone();
                        self.set(AuthState::SignedIn { session });
                        Ok(user)
                    }
                    Err(e) => {
                        self.set(AuthState::SignedOut);
                        Err(e)
                    }
                }
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<db::User> {
        let session = self.client.sign_in_with_password(email, password).await?;
        let user = session.user.clone();
        tracing::info!(user = user.email.as_deref().unwrap_or(&user.id), "signed in");
        self.set(AuthState::SignedIn { session });
        Ok(user)
    }

    /// Signs out locally, then revokes the token. A failed revoke is reported
    /// but the session is gone either way.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let previous = self.state.send_replace(AuthState::SignedOut);
        let AuthState::SignedIn { session } = previous else {
            return Ok(());
        };
        tracing::info!("signed out");
        self.client.sign_out(&session.access_token).await
    }

    /// The current auth session, if signed in.
    pub fn current(&self) -> Option<db::AuthSession> {
        match &*self.state.borrow() {
            AuthState::SignedOut => None,
            AuthState::SignedIn { session } => Some(session.clone()),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every auth state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// A client carrying the signed-in user's token, or the anonymous client.
    pub fn backend(&self) -> db::Client {
        match &*self.state.borrow() {
            AuthState::SignedOut => self.client.clone(),
            AuthState::SignedIn { session } => self.client.with_access_token(&session.access_token),
        }
    }

    fn set(&self, state: AuthState) {
        self.state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_session() -> db::AuthSession {
        db::AuthSession {
            access_token: "access".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            refresh_token: "refresh".to_string(),
            user: db::User {
                id: "u1".to_string(),
                email: Some("admin@example.test".to_string()),
            },
        }
    }

    fn session() -> Session {
        Session::start(db::Client::new("http://localhost:54321", "anon"))
    }

    #[test]
    fn starts_signed_out_with_anonymous_backend() {
        let session = session();
        assert_eq!(session.state(), AuthState::SignedOut);
        assert!(session.current().is_none());
        assert!(!session.backend().is_authenticated());
    }

    #[test]
    fn subscribers_observe_changes() {
        let session = session();
        let mut receiver = session.subscribe();
        session.set(AuthState::SignedIn {
            session: auth_session(),
        });
        assert!(receiver.has_changed().unwrap());
        assert_eq!(
            receiver.borrow_and_update().user().map(|u| u.id.as_str()),
            Some("u1")
        );
        assert!(session.backend().is_authenticated());
        assert_eq!(session.current(), Some(auth_session()));
    }

    #[tokio::test]
    async fn signing_out_when_signed_out_is_a_no_op() {
        let session = session();
        let receiver = session.subscribe();
        session.sign_out().await.unwrap();
        assert_eq!(*receiver.borrow(), AuthState::SignedOut);
    }
}
