//! Login and logout
//!
//! Credentials are checked against the `users` resource of the raw store.
//! Both transitions are recorded in the audit trail against the user record.

use std::sync::Arc;

use tracing::{debug, info};

use crate::audit::{ActivityType, AuditLog};
use crate::error::{RegisterError, RegisterResult};
use crate::models::resources::USERS;
use crate::models::Actor;
use crate::storage::{ListQuery, Store};

use super::password::verify_password;
use super::session::{ActorProvider, Session};

/// Signs users in and out of a `Session`
pub struct AuthService {
    store: Arc<dyn Store>,
    audit: AuditLog,
    session: Arc<Session>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, audit: AuditLog, session: Arc<Session>) -> Self {
        Self {
            store,
            audit,
            session,
        }
    }

    /// Verify credentials and sign the user in
    ///
    /// Unknown names and wrong passwords produce the same error.
    pub async fn login(&self, name: &str, password: &str) -> RegisterResult<Actor> {
        let rejected = || RegisterError::Auth("Invalid user name or password".into());

        let users = self
            .store
            .list(USERS, &ListQuery::all().filter_eq("name", name))
            .await?;
        let user = users.data.into_iter().next().ok_or_else(rejected)?;

        let stored = user.get_str("password").ok_or_else(rejected)?;
        if !verify_password(password, stored)? {
            debug!(user = name, "Password mismatch");
            return Err(rejected());
        }

        let actor = Actor::from_user(&user);
        self.session.sign_in(actor.clone());
        info!(user = %actor.name, "Logged in");

        self.audit
            .record(
                Some(&actor),
                ActivityType::Login,
                USERS,
                Some(actor.id),
                &format!("{} logged in", actor.name),
            )
            .await;

        Ok(actor)
    }

    /// Record the logout and clear the session
    ///
    /// Returns the actor that was signed in, or `None` if nobody was.
    pub async fn logout(&self) -> RegisterResult<Option<Actor>> {
        let Some(actor) = self.session.current_actor() else {
            return Ok(None);
        };

        self.audit
            .record(
                Some(&actor),
                ActivityType::Logout,
                USERS,
                Some(actor.id),
                &format!("{} logged out", actor.name),
            )
            .await;

        Ok(self.session.sign_out())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::fields_from;
    use crate::storage::JsonStore;
    use serde_json::json;

    async fn service() -> (AuthService, Arc<Session>, AuditLog) {
        let store: Arc<dyn Store> = Arc::new(JsonStore::in_memory());
        let hash = hash_password("s3cret").unwrap();
        store
            .create(
                USERS,
                fields_from(json!({"name": "ian", "password": hash, "adminRights": true})),
            )
            .await
            .unwrap();

        let session = Arc::new(Session::anonymous());
        let audit = AuditLog::new(store.clone());
        (
            AuthService::new(store, audit.clone(), session.clone()),
            session,
            audit,
        )
    }

    #[tokio::test]
    async fn test_login_signs_in_and_audits() {
        let (auth, session, audit) = service().await;

        let actor = auth.login("ian", "s3cret").await.unwrap();
        assert_eq!(actor.name, "ian");
        assert!(actor.admin);
        assert_eq!(session.current_actor(), Some(actor.clone()));

        let history = audit.history(USERS, actor.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].activity_type, ActivityType::Login);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (auth, session, audit) = service().await;

        let err = auth.login("ian", "nope").await.unwrap_err();
        assert!(matches!(err, RegisterError::Auth(_)));
        assert!(session.current_actor().is_none());

        let (_, total) = audit.entries(&ListQuery::all()).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let (auth, _, _) = service().await;
        assert!(auth.login("nobody", "s3cret").await.is_err());
    }

    #[tokio::test]
    async fn test_logout_records_entry() {
        let (auth, session, audit) = service().await;
        let actor = auth.login("ian", "s3cret").await.unwrap();

        let signed_out = auth.logout().await.unwrap();
        assert_eq!(signed_out, Some(actor.clone()));
        assert!(session.current_actor().is_none());

        let history = audit.history(USERS, actor.id).await.unwrap();
        assert_eq!(history.last().unwrap().activity_type, ActivityType::Logout);

        assert_eq!(auth.logout().await.unwrap(), None);
    }
}
