//! Who may log in, and how.
//!
//! The server core drives handshakes; deciding whether credentials are
//! any good is the identity provider's business. The provider hands back
//! a [`UserEntry`] naming the plugin to authenticate under and whatever
//! stored credential that plugin verifies against.

use futures_core::future::BoxFuture;

use crate::auth::double_sha1;
use crate::protocol::AuthPlugin;

/// The identity record for one user, as stored by the embedding.
#[derive(Debug, Clone)]
pub struct UserEntry {
    pub username: String,
    /// Plugin the server will insist on for this user.
    pub plugin: AuthPlugin,
    /// SHA1(SHA1(password)), verified by `mysql_native_password`. Empty or
    /// absent means the empty password.
    pub double_sha1: Option<Vec<u8>>,
    /// Cleartext password, compared by `mysql_clear_password`.
    pub password: Option<String>,
}

impl UserEntry {
    /// A `mysql_native_password` user. The password is hashed here; only
    /// its double SHA1 is retained.
    pub fn native(username: impl Into<String>, password: Option<&str>) -> Self {
        Self {
            username: username.into(),
            plugin: AuthPlugin::MySqlNativePassword,
            double_sha1: match password {
                Some("") | None => None,
                Some(password) => Some(double_sha1(password)),
            },
            password: None,
        }
    }

    /// A `mysql_clear_password` user.
    pub fn cleartext(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            plugin: AuthPlugin::MySqlClearPassword,
            double_sha1: None,
            password: Some(password.into()),
        }
    }

    /// An account nobody can log in to.
    pub fn no_login(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            plugin: AuthPlugin::MySqlNoLogin,
            double_sha1: None,
            password: None,
        }
    }

    /// An account authenticated by the Kerberos token exchange.
    pub fn kerberos(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            plugin: AuthPlugin::AuthenticationKerberos,
            double_sha1: None,
            password: None,
        }
    }
}

/// One round of a GSSAPI exchange.
#[derive(Debug)]
pub struct GssStep {
    /// Token to relay to the client. May accompany `done` when the
    /// exchange closes with a mutual-authentication token.
    pub token: Vec<u8>,
    pub done: bool,
    /// The authenticated principal, reported with the final step.
    pub identity: Option<String>,
}

/// A server-side GSSAPI security context, one per authentication attempt.
/// The core never looks inside tokens; it only relays them.
pub trait GssContext: Send {
    fn step(&mut self, client_token: &[u8]) -> BoxFuture<'_, crate::Result<GssStep>>;
}

/// Resolves usernames to identity records and owns whatever security
/// infrastructure the configured plugins need.
pub trait IdentityProvider: Send + Sync {
    fn get_user(&self, username: &str) -> BoxFuture<'_, crate::Result<Option<UserEntry>>>;

    /// Plugins this provider can back. The first entry is the default the
    /// server names in its greeting.
    fn plugins(&self) -> &[AuthPlugin] {
        &[AuthPlugin::MySqlNativePassword]
    }

    /// Open a security context for one `authentication_kerberos` attempt.
    fn gss_accept(&self) -> crate::Result<Box<dyn GssContext>> {
        Err(protocol_err!("identity provider has no GSSAPI backend"))
    }
}

/// The default provider: any username, empty password, native plugin.
///
/// Useful for tools where authentication is handled elsewhere (or nowhere).
#[derive(Debug, Default)]
pub struct AcceptAll;

impl IdentityProvider for AcceptAll {
    fn get_user(&self, username: &str) -> BoxFuture<'_, crate::Result<Option<UserEntry>>> {
        let entry = UserEntry::native(username, None);

        Box::pin(async move { Ok(Some(entry)) })
    }
}

#[cfg(test)]
mod tests {
    use super::{AcceptAll, IdentityProvider, UserEntry};

    #[tokio::test]
    async fn accept_all_knows_everyone() {
        let user = AcceptAll.get_user("whoever").await.unwrap().unwrap();

        assert_eq!(user.username, "whoever");
        assert!(user.double_sha1.is_none());
    }

    #[test]
    fn native_entries_never_hold_the_password() {
        let user = UserEntry::native("u", Some("secret"));

        assert!(user.password.is_none());
        assert_eq!(user.double_sha1.as_ref().map(Vec::len), Some(20));
    }
}
