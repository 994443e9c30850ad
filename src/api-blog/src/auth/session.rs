use base64::{Engine as _, engine::general_purpose};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "session";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid token format")]
    InvalidFormat,

    #[error("HMAC error: {0}")]
    HmacError(String),

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

/// Generate a session token for a user with format: user_id:timestamp:nonce:signature
/// The signature is HMAC-SHA256(user_id:timestamp:nonce, secret)
pub fn generate_session_token(user_id: i32, secret: &str) -> Result<String, SessionError> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    // Generate cryptographically secure random nonce
    let nonce: [u8; 16] = rand::random();
    let nonce_b64 = general_purpose::URL_SAFE_NO_PAD.encode(nonce);

    let payload = format!("{}:{}:{}", user_id, timestamp, nonce_b64);
    // Sign payload with HMAC-SHA256
    let code_bytes = signer(secret)?.chain_update(payload.as_bytes()).finalize().into_bytes();
    let signature = general_purpose::URL_SAFE_NO_PAD.encode(code_bytes);

    Ok(format!("{}:{}", payload, signature))
}

/// Validate a session token and extract the user id it was issued for.
/// Returns Ok(Some(user_id)) if signed with `secret` and not older than `max_age_secs`,
/// Ok(None) if the signature doesn't match or the token expired,
/// and an error if the token isn't shaped like one we issue.
pub fn validate_session_token(token: &str, secret: &str, max_age_secs: u64) -> Result<Option<i32>, SessionError> {
    let parts: Vec<&str> = token.split(':').collect();
    let [user_id_str, timestamp_str, nonce, provided_signature] = parts.as_slice() else {
        return Err(SessionError::InvalidFormat);
    };

    let user_id: i32 = user_id_str.parse().map_err(|_| SessionError::InvalidFormat)?;
    let timestamp: u64 = timestamp_str.parse().map_err(|_| SessionError::InvalidFormat)?;
    let provided_signature = general_purpose::URL_SAFE_NO_PAD.decode(provided_signature)?;

    let current_time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    if current_time.saturating_sub(timestamp) > max_age_secs {
        return Ok(None); // Expired
    }

    // Constant-time comparison
    let payload = format!("{}:{}:{}", user_id_str, timestamp_str, nonce);
    let verified = signer(secret)?
        .chain_update(payload.as_bytes())
        .verify_slice(&provided_signature)
        .is_ok();

    Ok(verified.then_some(user_id))
}

/// Create a session cookie with the token
pub fn create_session_cookie(token: &str, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX)))
        .path("/")
        .build()
}

/// Create a cookie to clear the session (for logout)
pub fn create_logout_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(0))
        .path("/")
        .build()
}

/// Parse session token from Cookie header
pub fn parse_session_cookie(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .find(|cookie| cookie.name() == COOKIE_NAME && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

fn signer(secret: &str) -> Result<HmacSha256, SessionError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| SessionError::HmacError(e.to_string()))
}
