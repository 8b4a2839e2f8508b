//! ES256 signing and verification of access tokens

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::token::Claims;
use crate::errors::{SignerError, VerifyError};

/// Signs and verifies compact claim tokens with an ECDSA P-256 key pair
///
/// Key material is loaded once from PEM files at construction and held for
/// the signer's lifetime; there is no runtime key rotation.
pub struct Signer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

impl Signer {
    /// Creates a signer from PEM key file paths
    pub fn from_pem_files<P: AsRef<Path>>(
        private_key_path: P,
        public_key_path: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SignerError> {
        let private_key_pem =
            fs::read(private_key_path.as_ref()).map_err(|e| SignerError::KeyLoad {
                message: format!("Failed to read private key: {}", e),
            })?;
        let public_key_pem =
            fs::read(public_key_path.as_ref()).map_err(|e| SignerError::KeyLoad {
                message: format!("Failed to read public key: {}", e),
            })?;

        Self::from_pems(&private_key_pem, &public_key_pem, clock)
    }

    /// Creates a signer from in-memory PEM strings
    pub fn from_pem_strings(
        private_key_pem: &str,
        public_key_pem: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SignerError> {
        Self::from_pems(
            private_key_pem.as_bytes(),
            public_key_pem.as_bytes(),
            clock,
        )
    }

    fn from_pems(
        private_key_pem: &[u8],
        public_key_pem: &[u8],
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SignerError> {
        let encoding_key =
            EncodingKey::from_ec_pem(private_key_pem).map_err(|e| SignerError::KeyLoad {
                message: format!("Invalid private key format: {}", e),
            })?;
        let decoding_key =
            DecodingKey::from_ec_pem(public_key_pem).map_err(|e| SignerError::KeyLoad {
                message: format!("Invalid public key format: {}", e),
            })?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            clock,
        })
    }

    /// Mints a signed access token for `subject` with the given lifetime
    pub fn mint(&self, subject: Uuid, ttl: Duration) -> Result<String, SignerError> {
        let claims = Claims::new_access_token(subject, self.clock.now(), ttl);
        let header = Header::new(Algorithm::ES256);

        encode(&header, &claims, &self.encoding_key).map_err(|e| SignerError::Signing {
            message: e.to_string(),
        })
    }

    /// Verifies a token's signature and claims
    ///
    /// Requires `exp`, `iat`, `sub` and `jti` to be present. Fails closed:
    /// any parse failure that is not a recognized expiry or missing-claim
    /// condition is reported as an invalid signature.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(claim) => {
                    VerifyError::MissingClaim {
                        claim: claim.clone(),
                    }
                }
                jsonwebtoken::errors::ErrorKind::Json(err) => missing_field_error(&err.to_string()),
                _ => VerifyError::InvalidSignature,
            })?;

        Ok(token_data.claims)
    }
}

/// Maps a serde decode failure onto the claim taxonomy
///
/// The claims struct makes every required claim a mandatory field, so an
/// absent claim surfaces as a `missing field` deserialization error once
/// the signature has already checked out. Anything else stays an invalid
/// signature.
fn missing_field_error(message: &str) -> VerifyError {
    if message.starts_with("missing field") {
        let claim = message
            .split('`')
            .nth(1)
            .unwrap_or("unknown")
            .to_string();
        VerifyError::MissingClaim { claim }
    } else {
        VerifyError::InvalidSignature
    }
}
