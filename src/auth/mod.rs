//! Authentication plugin state machines.
//!
//! Each plugin is a small state object the connection drives: feed it the
//! latest client message, get back either bytes to relay (wrapped in an
//! auth-more-data packet) or a terminal verdict. Multi-round exchanges
//! fall out of this shape without any plugin knowing about packets or
//! sequence ids.

mod clear_password;
mod kerberos;
mod native_password;
mod no_login;

pub use clear_password::ClearPassword;
pub use kerberos::Kerberos;
pub(crate) use native_password::double_sha1;
pub use native_password::{scramble, NativePassword};
pub use no_login::NoLogin;

use futures_core::future::BoxFuture;

/// How an exchange ended.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthVerdict {
    Accept {
        /// Kerberos-style plugins may resolve a principal that differs
        /// from the login username.
        identity: Option<String>,
        /// A final plugin message (e.g. the closing token of a mutual GSS
        /// handshake), relayed to the client just before the OK packet.
        data: Option<Vec<u8>>,
    },
    Reject,
}

impl AuthVerdict {
    pub fn accept() -> Self {
        AuthVerdict::Accept {
            identity: None,
            data: None,
        }
    }
}

/// One step of an exchange.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthStep {
    /// Send these bytes to the client and feed its reply back in.
    Exchange(Vec<u8>),
    Done(AuthVerdict),
}

/// A plugin mid-exchange. `advance` consumes the latest client message:
/// the auth response from the handshake (or auth-switch reply), then each
/// subsequent packet of the conversation.
pub trait AuthState: Send {
    fn advance(&mut self, reply: &[u8]) -> BoxFuture<'_, crate::Result<AuthStep>>;
}
