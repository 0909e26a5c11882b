use futures_core::future::BoxFuture;
use sha1::{Digest, Sha1};

use crate::auth::{AuthStep, AuthState, AuthVerdict};

/// `mysql_native_password`: single round, challenge sent in the greeting
/// (or auth-switch request).
///
/// The stored credential is the double SHA1 of the password; the client
/// proves knowledge of the password without revealing either.
pub struct NativePassword {
    /// SHA1(SHA1(password)); empty or absent means "empty password".
    stored: Vec<u8>,
    nonce: [u8; 20],
}

impl NativePassword {
    pub fn new(stored: Option<Vec<u8>>, nonce: [u8; 20]) -> Self {
        Self {
            stored: stored.unwrap_or_default(),
            nonce,
        }
    }
}

impl AuthState for NativePassword {
    fn advance(&mut self, reply: &[u8]) -> BoxFuture<'_, crate::Result<AuthStep>> {
        let verdict = if verify(&self.stored, &self.nonce, reply) {
            AuthVerdict::accept()
        } else {
            AuthVerdict::Reject
        };

        Box::pin(async move { Ok(AuthStep::Done(verdict)) })
    }
}

/// The client's proof: `SHA1(password) XOR SHA1(nonce || SHA1(SHA1(password)))`.
///
/// Here so tests (and embedded clients) can produce valid responses.
pub fn scramble(password: &str, nonce: &[u8]) -> [u8; 20] {
    let mut ctx = Sha1::new();

    ctx.update(password);
    let pw_hash = ctx.finalize_reset();

    ctx.update(pw_hash);
    let pw_hash_hash = ctx.finalize_reset();

    ctx.update(nonce);
    ctx.update(pw_hash_hash);
    let nonce_hash = ctx.finalize();

    let mut out = [0_u8; 20];

    for (i, (a, b)) in pw_hash.iter().zip(nonce_hash.iter()).enumerate() {
        out[i] = a ^ b;
    }

    out
}

/// Check a client response against the stored double SHA1.
///
/// XOR-ing the response with `SHA1(nonce || stored)` recovers the
/// candidate `SHA1(password)`; hashing that once more must land on the
/// stored value. An empty response claims an empty password and is
/// accepted only when the stored hash is empty too.
fn verify(stored: &[u8], nonce: &[u8], response: &[u8]) -> bool {
    if response.is_empty() {
        return stored.is_empty();
    }

    if stored.len() != 20 || response.len() != 20 {
        return false;
    }

    let mut ctx = Sha1::new();

    ctx.update(nonce);
    ctx.update(stored);
    let nonce_hash = ctx.finalize_reset();

    let mut candidate = [0_u8; 20];

    for i in 0..20 {
        candidate[i] = response[i] ^ nonce_hash[i];
    }

    ctx.update(candidate);

    ctx.finalize().as_slice() == stored
}

/// SHA1(SHA1(password)), the form credentials are stored in.
pub(crate) fn double_sha1(password: &str) -> Vec<u8> {
    let mut ctx = Sha1::new();

    ctx.update(password);
    let first = ctx.finalize_reset();

    ctx.update(first);

    ctx.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::{double_sha1, scramble, verify};

    const NONCE: &[u8] = b"\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x0c\x0d\x0e\x0f\x10\x11\x12\x13\x14";

    // verify(h(h(p)), c, response(p, c)) holds for any p and c
    #[test]
    fn scramble_and_verify_agree() {
        for password in ["", "secret", "pässwörd", "a much longer password 1234567890"] {
            let stored = if password.is_empty() {
                Vec::new()
            } else {
                double_sha1(password)
            };

            let response = if password.is_empty() {
                Vec::new()
            } else {
                scramble(password, NONCE).to_vec()
            };

            assert!(verify(&stored, NONCE, &response), "password {:?}", password);
        }
    }

    #[test]
    fn it_rejects_a_wrong_password() {
        let stored = double_sha1("right");
        let response = scramble("wrong", NONCE);

        assert!(!verify(&stored, NONCE, &response));
    }

    #[test]
    fn it_rejects_an_empty_response_for_a_set_password() {
        let stored = double_sha1("secret");

        assert!(!verify(&stored, NONCE, &[]));
    }

    #[test]
    fn it_rejects_a_response_under_a_different_nonce() {
        let stored = double_sha1("secret");
        let response = scramble("secret", NONCE);

        assert!(!verify(&stored, b"another-20-byte-seed", &response));
    }
}
