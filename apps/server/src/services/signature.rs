//! GitHub webhook signature validation (`X-Hub-Signature-256`).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify `sha256=<hex>` against an HMAC-SHA256 of the raw payload.
///
/// The comparison is constant-time.
pub fn verify_signature(secret: &SecretString, payload: &[u8], signature: &str) -> bool {
    let Some(sig) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let sig_bytes = match hex::decode(sig) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&sig_bytes).is_ok()
}
