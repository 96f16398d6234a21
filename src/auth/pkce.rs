//! PKCE verifier and challenge generation (RFC 7636, S256 method).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Unreserved characters used for verifiers and state values.
const VERIFIER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Shortest verifier RFC 7636 permits.
pub const MIN_VERIFIER_LENGTH: usize = 43;
/// Longest verifier RFC 7636 permits; flows here always use the maximum.
pub const MAX_VERIFIER_LENGTH: usize = 128;

/// Length of the anti-CSRF `state` parameter.
const STATE_LENGTH: usize = 16;

/// Generate `length` cryptographically random characters from `[A-Za-z0-9]`.
pub fn generate_verifier(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| VERIFIER_CHARSET[rng.random_range(0..VERIFIER_CHARSET.len())] as char)
        .collect()
}

/// Generate a random `state` value for the authorization request.
pub fn generate_state() -> String {
    generate_verifier(STATE_LENGTH)
}

/// Derive the S256 code challenge: base64url(SHA-256(verifier)), unpadded.
pub fn derive_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
