//! Credential store mapping API keys to client identities
//!
//! Built once from the gateway table at startup and read-only afterwards.
//! Keys are held as SHA-256 digests; the plaintext key does not outlive
//! configuration loading.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use super::error::GatewayError;

/// Identity of a configured gateway client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory API key table with O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    by_digest: HashMap<String, ClientId>,
}

impl CredentialStore {
    /// Build the store from `(api_key, client_id)` pairs.
    ///
    /// Duplicate keys are a configuration error: two clients sharing a key
    /// would make the rate-limit scoping ambiguous.
    pub fn from_entries<I, K, C>(entries: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: Into<ClientId>,
    {
        let mut by_digest = HashMap::new();

        for (key, client) in entries {
            let key = key.as_ref();

            if key.trim().is_empty() {
                return Err(GatewayError::configuration("empty api key in table"));
            }

            let client = client.into();

            if by_digest.insert(digest(key), client.clone()).is_some() {
                return Err(GatewayError::configuration(format!(
                    "duplicate api key for client '{}'",
                    client
                )));
            }
        }

        Ok(Self { by_digest })
    }

    /// Look up the client owning `api_key`. `None` means the key is unknown;
    /// the caller decides whether that is a 401 or a 403 (it knows whether a
    /// credential header was present at all).
    pub fn lookup(&self, api_key: &str) -> Option<&ClientId> {
        self.by_digest.get(&digest(api_key))
    }

    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

fn digest(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}
