//! CLOB API Credentials
//!
//! Level-2 API credentials authenticate the User channel and the
//! `clob_user` topic of the LiveData channel. They are obtained elsewhere
//! and treated here as an opaque, read-only value.
//!
//! # Wire Forms
//!
//! The two channels expect different field names for the same values:
//!
//! ```json
//! {"apiKey": "...", "secret": "...", "passphrase": "..."}   // User handshake
//! {"key": "...", "secret": "...", "passphrase": "..."}      // LiveData clob_auth
//! ```

use serde::Serialize;

/// API key, secret and passphrase.
///
/// `Debug` output never contains the values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    api_passphrase: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String, api_secret: String, api_passphrase: String) -> Self {
        Self {
            api_key,
            api_secret,
            api_passphrase,
        }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Get the API passphrase.
    #[must_use]
    pub fn api_passphrase(&self) -> &str {
        &self.api_passphrase
    }

    /// Form used in the User channel handshake.
    #[must_use]
    pub fn user_auth(&self) -> UserAuth<'_> {
        UserAuth {
            api_key: &self.api_key,
            secret: &self.api_secret,
            passphrase: &self.api_passphrase,
        }
    }

    /// Form injected as `clob_auth` into LiveData `clob_user` entries.
    #[must_use]
    pub fn clob_auth(&self) -> ClobAuth<'_> {
        ClobAuth {
            key: &self.api_key,
            secret: &self.api_secret,
            passphrase: &self.api_passphrase,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("api_passphrase", &"[REDACTED]")
            .finish()
    }
}

/// Credentials with User channel field names.
#[derive(Clone, Copy, Serialize)]
pub struct UserAuth<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
    secret: &'a str,
    passphrase: &'a str,
}

/// Credentials with LiveData `clob_auth` field names.
#[derive(Clone, Copy, Serialize)]
pub struct ClobAuth<'a> {
    key: &'a str,
    secret: &'a str,
    passphrase: &'a str,
}
