//! Far-future security tokens.
//!
//! Token = base64url(HMAC-SHA256(secret, mtime ‖ scheme ‖ encoded relative path)).
//! Legacy paths carry no scheme and are signed with an empty one.

use std::fmt;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::farfuture::codec::{encode_path, FarFuturePath};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Far-future secret must not be empty")]
    EmptySecret,

    #[error("HMAC key error: {0}")]
    Key(String),
}

/// Signs and verifies far-future tokens with the site-wide secret.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, SignerError> {
        if secret.is_empty() {
            return Err(SignerError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| SignerError::Key(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Token for a file with the given modification time and location.
    pub fn sign(&self, mtime: u64, scheme: &str, relative_path: &str) -> String {
        let mac = self.keyed(mtime, scheme, relative_path);
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of the token carried by `path`.
    pub fn verify(&self, path: &FarFuturePath) -> bool {
        let Ok(signature) = URL_SAFE_NO_PAD.decode(&path.security_token) else {
            return false;
        };
        self.keyed(path.mtime, path.scheme.as_deref().unwrap_or(""), &path.relative_path)
            .verify_slice(&signature)
            .is_ok()
    }

    fn keyed(&self, mtime: u64, scheme: &str, relative_path: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(mtime.to_string().as_bytes());
        mac.update(scheme.as_bytes());
        mac.update(encode_path(relative_path).as_bytes());
        mac
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSigner { .. }")
    }
}
