use futures_core::future::BoxFuture;

use crate::auth::{AuthStep, AuthState, AuthVerdict};

/// `mysql_no_login`: accounts that exist only to be impersonated via
/// proxying or to own objects. Every exchange fails.
pub struct NoLogin;

impl AuthState for NoLogin {
    fn advance(&mut self, _reply: &[u8]) -> BoxFuture<'_, crate::Result<AuthStep>> {
        Box::pin(async { Ok(AuthStep::Done(AuthVerdict::Reject)) })
    }
}
