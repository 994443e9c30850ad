use serde::Deserialize;

/// Session signing keys shorter than this are rejected at startup.
pub const MIN_SESSION_KEY_BYTES: usize = 32;

/// The `[session]` table: cookie signing and credential hashing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Secret used to HMAC-sign session cookies.
    /// Generate one with: openssl rand -base64 32
    pub key: String,

    /// How long an issued session cookie stays valid.
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u64,

    /// Login responses never complete faster than this, whatever the outcome.
    #[serde(default = "default_min_login_millis")]
    pub min_login_millis: u64,

    /// bcrypt work factor for newly registered passwords.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_duration_seconds() -> u64 {
    86400 // 24 hours
}

fn default_min_login_millis() -> u64 {
    1000
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl AuthConfig {
    /// Returns a description of the first invalid setting, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.key.len() < MIN_SESSION_KEY_BYTES {
            return Err(format!(
                "session.key must be at least {} bytes (got {})",
                MIN_SESSION_KEY_BYTES,
                self.key.len()
            ));
        }
        if self.duration_seconds == 0 {
            return Err("session.duration_seconds must be positive".to_string());
        }
        // bcrypt's accepted cost range
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(format!("session.bcrypt_cost must be within 4..=31 (got {})", self.bcrypt_cost));
        }
        Ok(())
    }
}
