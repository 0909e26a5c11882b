use futures_core::future::BoxFuture;

use crate::auth::{AuthStep, AuthState, AuthVerdict};
use crate::identity::GssContext;

/// `authentication_kerberos`: a GSSAPI token relay.
///
/// The plugin never inspects the tokens. Each client token goes to the
/// identity provider's security context; whatever token comes back is
/// relayed to the client, until the context reports the exchange
/// complete.
pub struct Kerberos {
    context: Box<dyn GssContext>,
}

impl Kerberos {
    pub fn new(context: Box<dyn GssContext>) -> Self {
        Self { context }
    }
}

impl AuthState for Kerberos {
    fn advance(&mut self, reply: &[u8]) -> BoxFuture<'_, crate::Result<AuthStep>> {
        let reply = reply.to_vec();

        Box::pin(async move {
            let step = self.context.step(&reply).await?;

            if step.done {
                return Ok(AuthStep::Done(AuthVerdict::Accept {
                    identity: step.identity,
                    data: if step.token.is_empty() {
                        None
                    } else {
                        Some(step.token)
                    },
                }));
            }

            if step.token.is_empty() {
                // a context that is neither done nor has anything to say
                // cannot make progress
                return Ok(AuthStep::Done(AuthVerdict::Reject));
            }

            Ok(AuthStep::Exchange(step.token))
        })
    }
}
