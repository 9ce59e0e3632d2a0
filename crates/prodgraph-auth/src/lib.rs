//! prodgraph-auth: bearer-token verification for the ontology service.
//!
//! Tokens are HS256 JWTs signed with a shared secret and checked for
//! signature, expiry, issuer, and audience. Every verification failure is
//! surfaced as the single uniform [`OntologyError::Auth`]; the reason is
//! logged at debug level only, so callers cannot distinguish a malformed
//! token from an expired one. Verification is stateless per call — there
//! is no revocation list, tokens stay valid until natural expiry.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use prodgraph_core::OntologyError;

/// Minimum secret length in bytes. Anything shorter is refused at startup.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_ISSUER: &str = "prodgraph";
const DEFAULT_AUDIENCE: &str = "prodgraph-clients";
const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verifier configuration supplied at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl_secs: u64,
    /// Clock-skew tolerance applied to `exp`.
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }
}

/// Startup-time configuration failures. Distinct from [`OntologyError`]:
/// a bad secret is an operator mistake, not a request failure.
#[derive(Debug, Error)]
pub enum AuthSetupError {
    #[error("token secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
}

/// Verified identity facts extracted from a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user identifier.
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless HS256 token verifier and issuer.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    token_ttl_secs: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Result<Self, AuthSetupError> {
        if config.secret.len() < MIN_SECRET_LEN {
            return Err(AuthSetupError::SecretTooShort);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&config.issuer));
        validation.set_audience(std::slice::from_ref(&config.audience));
        validation.leeway = config.leeway_secs;

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer,
            audience: config.audience,
            token_ttl_secs: config.token_ttl_secs,
        })
    }

    /// Verify a bearer token and extract its claims.
    ///
    /// All failure modes collapse into `OntologyError::Auth`.
    pub fn verify(&self, token: &str) -> Result<Claims, OntologyError> {
        let token = token.trim();
        if token.is_empty() {
            tracing::debug!("token verification failed: empty token");
            return Err(OntologyError::Auth);
        }

        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => {
                tracing::debug!(reason = %err, "token verification failed");
                Err(OntologyError::Auth)
            }
        }
    }

    /// Mint a token for a subject with the configured TTL.
    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<String, OntologyError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + self.token_ttl_secs as i64,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "failed to sign token");
            OntologyError::Internal("failed to sign token".to_string())
        })
    }
}
