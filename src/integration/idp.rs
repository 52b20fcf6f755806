use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey};

#[derive(Clone)]
pub struct Config {
    secret: Arc<[u8]>,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Config {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            secret: secret.into().into_bytes().into(),
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

#[cfg(test)]
impl Config {
    pub fn test() -> Self {
        Self::new(
            "test-secret",
            "simple_chat",
            Duration::from_secs(300),
            Duration::from_secs(86400),
        )
    }
}
