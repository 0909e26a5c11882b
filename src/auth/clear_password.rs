use futures_core::future::BoxFuture;

use crate::auth::{AuthStep, AuthState, AuthVerdict};

/// `mysql_clear_password`: the client sends the password in the clear,
/// with a trailing NUL that belongs to the protocol, not the password.
pub struct ClearPassword {
    stored: Option<String>,
}

impl ClearPassword {
    pub fn new(stored: Option<String>) -> Self {
        Self { stored }
    }
}

impl AuthState for ClearPassword {
    fn advance(&mut self, reply: &[u8]) -> BoxFuture<'_, crate::Result<AuthStep>> {
        let password = reply.strip_suffix(b"\x00").unwrap_or(reply);

        let accepted = match &self.stored {
            Some(stored) => stored.as_bytes() == password,
            None => password.is_empty(),
        };

        let verdict = if accepted {
            AuthVerdict::accept()
        } else {
            AuthVerdict::Reject
        };

        Box::pin(async move { Ok(AuthStep::Done(verdict)) })
    }
}
