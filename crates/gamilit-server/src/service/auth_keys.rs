//! Keys and validation rules for bearer token decoding.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::extract::Identity;
use crate::handler;
use crate::service::{Result, ServiceError};
use crate::utility::tracing_targets;

/// Token validation settings.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AuthKeysConfig {
    /// Shared HMAC secret the tokens are signed with.
    #[cfg_attr(feature = "config", arg(long = "auth-secret", env = "AUTH_SECRET"))]
    pub auth_secret: String,

    /// Expected `iss` claim. Not checked when unset.
    #[cfg_attr(feature = "config", arg(long = "auth-issuer", env = "AUTH_ISSUER"))]
    #[serde(default)]
    pub auth_issuer: Option<String>,

    /// Expected `aud` claim. Not checked when unset.
    #[cfg_attr(feature = "config", arg(long = "auth-audience", env = "AUTH_AUDIENCE"))]
    #[serde(default)]
    pub auth_audience: Option<String>,

    /// Clock skew tolerated on `exp`, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "auth-leeway-secs", env = "AUTH_LEEWAY_SECS", default_value_t = 30)
    )]
    #[serde(default = "AuthKeysConfig::default_leeway_secs")]
    pub auth_leeway_secs: u64,
}

impl AuthKeysConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            auth_secret: secret.into(),
            auth_issuer: None,
            auth_audience: None,
            auth_leeway_secs: Self::default_leeway_secs(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.auth_issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.auth_audience = Some(audience.into());
        self
    }

    pub fn with_leeway_secs(mut self, secs: u64) -> Self {
        self.auth_leeway_secs = secs;
        self
    }

    fn default_leeway_secs() -> u64 {
        30
    }
}

impl fmt::Debug for AuthKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeysConfig")
            .field("auth_secret", &"****")
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("auth_leeway_secs", &self.auth_leeway_secs)
            .finish()
    }
}

/// Decoding key and validation rules shared by every request.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    /// Builds the keys from configuration.
    ///
    /// Fails when the secret is empty.
    pub fn from_config(config: &AuthKeysConfig) -> Result<Self> {
        if config.auth_secret.is_empty() {
            return Err(ServiceError::config("authentication secret cannot be empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.auth_leeway_secs;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        if let Some(issuer) = &config.auth_issuer {
            validation.set_issuer(&[issuer]);
        }

        match &config.auth_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        tracing::debug!(
            target: tracing_targets::SERVICE,
            issuer = ?config.auth_issuer,
            audience = ?config.auth_audience,
            leeway_secs = config.auth_leeway_secs,
            "authentication keys loaded"
        );

        let inner = AuthKeysInner {
            decoding_key: DecodingKey::from_secret(config.auth_secret.as_bytes()),
            validation,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    #[inline]
    pub fn validation(&self) -> &Validation {
        &self.inner.validation
    }

    /// Verifies `token` and returns the caller it identifies.
    pub fn decode_identity(&self, token: &str) -> handler::Result<Identity> {
        let data = jsonwebtoken::decode::<Identity>(token, self.decoding_key(), self.validation())
            .inspect_err(|error| {
                tracing::debug!(
                    target: tracing_targets::AUTHENTICATION,
                    error = %error,
                    "bearer token rejected"
                );
            })?;

        Ok(data.claims)
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys")
            .field("leeway", &self.inner.validation.leeway)
            .finish_non_exhaustive()
    }
}
