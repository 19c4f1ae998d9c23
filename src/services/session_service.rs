//! Token-based session persistence under the `token` and `user` keys. Token
//! issuance and validation belong to the backend; this only stores what the
//! backend returned and answers the auth gate.

use std::sync::Arc;

use crate::dto::auth::LoginRequest;
use crate::error::AppResult;
use crate::models::{Session, UserProfile};
use crate::services::order_backend::OrderBackend;
use crate::store::{KvStore, KvStoreExt, TOKEN_KEY, USER_KEY};

pub struct SessionService {
    store: Arc<dyn KvStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn current(&self) -> Option<Session> {
        let token: String = self.store.read(TOKEN_KEY).ok().flatten()?;
        let user: UserProfile = self.store.read(USER_KEY).ok().flatten()?;
        Some(Session { token, user })
    }

    /// Both the token and the profile must be present.
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub async fn login(
        &self,
        backend: &dyn OrderBackend,
        request: LoginRequest,
    ) -> AppResult<Session> {
        let session = backend.login(request).await?;
        self.store.write(TOKEN_KEY, &session.token)?;
        self.store.write(USER_KEY, &session.user)?;
        tracing::info!(user = %session.user.email, "login");
        Ok(session)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        tracing::info!("logout");
        Ok(())
    }
}
