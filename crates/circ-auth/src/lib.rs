//! Authentication collaborator for the circulation system.
//!
//! Two login paths: readers log in with their identifier alone (student or
//! card number), staff log in with username/password credentials. Sessions
//! are plain values; there is no server-side session state to invalidate,
//! so `logout` simply acknowledges.

use async_trait::async_trait;
use circ_store::{ReaderStore, StoreError};
use circ_types::ReaderId;

/// Who a session belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Reader,
    Admin,
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn reader(subject: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            name: name.into(),
            role: Role::Reader,
        }
    }

    pub fn admin(subject: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            name: name.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Errors from authentication attempts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("unknown reader: {0}")]
    UnknownReader(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("auth backend failure: {0}")]
    Upstream(#[from] StoreError),
}

/// Result alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Log a reader in by their identifier alone.
    async fn login_by_identifier(&self, reader_id: &str) -> AuthResult<Session>;

    /// Log staff in by username and password.
    async fn login_by_credentials(&self, username: &str, password: &str) -> AuthResult<Session>;

    /// End a session.
    async fn logout(&self, session: &Session) -> AuthResult<()>;
}

/// A configured staff account.
#[derive(Clone, Debug)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl AdminAccount {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }
}

/// Auth provider backed by the reader registry plus a configured list of
/// staff accounts.
pub struct LibraryAuth<S> {
    readers: S,
    admins: Vec<AdminAccount>,
}

impl<S> LibraryAuth<S> {
    pub fn new(readers: S, admins: Vec<AdminAccount>) -> Self {
        Self { readers, admins }
    }
}

#[async_trait]
impl<S> AuthProvider for LibraryAuth<S>
where
    S: ReaderStore,
{
    async fn login_by_identifier(&self, reader_id: &str) -> AuthResult<Session> {
        let id = ReaderId::new(reader_id)
            .map_err(|_| AuthError::UnknownReader(reader_id.to_string()))?;
        match self.readers.get_reader(&id)? {
            Some(reader) => Ok(Session::reader(reader.id.to_string(), reader.name)),
            None => Err(AuthError::UnknownReader(reader_id.to_string())),
        }
    }

    async fn login_by_credentials(&self, username: &str, password: &str) -> AuthResult<Session> {
        self.admins
            .iter()
            .find(|a| a.username == username && a.password == password)
            .map(|a| Session::admin(a.username.clone(), a.display_name.clone()))
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn logout(&self, _session: &Session) -> AuthResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use circ_store::InMemoryLibrary;
    use circ_types::Reader;

    use super::*;

    fn auth_with_reader() -> LibraryAuth<InMemoryLibrary> {
        let store = InMemoryLibrary::new();
        store
            .insert_reader(Reader::new(ReaderId::new("S1").unwrap(), "Mara Lin"))
            .unwrap();
        LibraryAuth::new(store, vec![AdminAccount::new("admin", "hunter2", "Librarian")])
    }

    #[tokio::test]
    async fn reader_login_by_identifier() {
        let auth = auth_with_reader();
        let session = auth.login_by_identifier("S1").await.unwrap();
        assert_eq!(session.subject, "S1");
        assert_eq!(session.name, "Mara Lin");
        assert_eq!(session.role, Role::Reader);
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn unknown_reader_is_rejected() {
        let auth = auth_with_reader();
        let err = auth.login_by_identifier("S404").await.unwrap_err();
        assert_eq!(err, AuthError::UnknownReader("S404".into()));

        let err = auth.login_by_identifier("").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownReader(_)));
    }

    #[tokio::test]
    async fn admin_login_by_credentials() {
        let auth = auth_with_reader();
        let session = auth.login_by_credentials("admin", "hunter2").await.unwrap();
        assert_eq!(session.name, "Librarian");
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = auth_with_reader();
        let err = auth.login_by_credentials("admin", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);

        let err = auth.login_by_credentials("nobody", "hunter2").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn logout_acknowledges() {
        let auth = auth_with_reader();
        let session = auth.login_by_identifier("S1").await.unwrap();
        auth.logout(&session).await.unwrap();
    }
}
