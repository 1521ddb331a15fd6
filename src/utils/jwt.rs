// src/utils/jwt.rs
//! JWT codec for the mock Secure Token Service.
//!
//! Builds and reads the signed tokens every other component works with.
//! Key selection follows the participant registry: participants with a
//! vault key override sign RS256 under their vault key reference, everyone
//! else signs ES256 with the shared mock key under `<did>#key1`.

use crate::error::ServiceError;
use crate::models::claims::TokenClaims;
use crate::registry::participant_registry::ParticipantRegistry;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use std::sync::Arc;

/// Fixed `nbf` claim of all mock-issued tokens.
pub const MOCK_NOT_BEFORE: i64 = 1_541_493_724;

/// Fixed `iat` claim of all mock-issued tokens.
pub const MOCK_ISSUED_AT: i64 = 1_541_493_724;

/// Fixed `exp` claim of all mock-issued tokens (far future).
pub const MOCK_EXPIRY: i64 = 32_481_718_133;

/// Token signer selecting key material per signer identity.
pub struct TokenSigner {
    /// Registry consulted for per-participant key overrides
    registry: Arc<ParticipantRegistry>,

    /// Shared ES256 key used by every participant without an override
    shared_key: EncodingKey,
}

impl TokenSigner {
    /// Creates a signer from the shared ES256 private key.
    ///
    /// # Errors
    /// Returns `KeyResolution` if the shared key PEM cannot be parsed;
    /// this fails the service at startup rather than on the first request.
    pub fn new(
        registry: Arc<ParticipantRegistry>,
        shared_private_key_pem: &str,
    ) -> Result<Self, ServiceError> {
        let shared_key = EncodingKey::from_ec_pem(shared_private_key_pem.as_bytes())
            .map_err(|e| ServiceError::KeyResolution(format!("shared ES256 key unusable: {e}")))?;
        Ok(TokenSigner {
            registry,
            shared_key,
        })
    }

    /// Signs the claims with the key material registered for `signer`.
    ///
    /// Participants with a vault key override sign RS256 under their vault
    /// key reference; any other signer (registered or not) uses the shared
    /// ES256 key under `<signer>#key1`. Unset time claims are filled with
    /// the fixed mock values before signing; values the caller set (the
    /// refresh path carries the original `iat`/`exp`) are kept.
    pub fn issue(&self, claims: TokenClaims, signer: &str) -> Result<String, ServiceError> {
        let claims = with_default_times(claims);
        let token = match self
            .registry
            .get(signer)
            .and_then(|participant| participant.signing_key.as_ref())
        {
            Some(key) => self.sign_rs256(&claims, &key.vault_kid, &key.private_key_pem)?,
            None => self.sign_es256(&claims, &format!("{signer}#key1"))?,
        };
        debug!("issued token for claims {claims:?} signed by {signer}");
        Ok(token)
    }

    /// Signs the claims RS256 with explicitly supplied key material,
    /// bypassing the registry lookup.
    ///
    /// Used to embed the vault-signed copy of a refreshed access token.
    pub fn issue_with_explicit_key(
        &self,
        claims: TokenClaims,
        key_ref: &str,
        key_pem: &str,
    ) -> Result<String, ServiceError> {
        let claims = with_default_times(claims);
        self.sign_rs256(&claims, key_ref, key_pem)
    }

    fn sign_es256(&self, claims: &TokenClaims, kid: &str) -> Result<String, ServiceError> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &self.shared_key)
            .map_err(|e| ServiceError::Signing(e.to_string()))
    }

    fn sign_rs256(
        &self,
        claims: &TokenClaims,
        kid: &str,
        key_pem: &str,
    ) -> Result<String, ServiceError> {
        let key = EncodingKey::from_rsa_pem(key_pem.as_bytes()).map_err(|e| {
            ServiceError::KeyResolution(format!("vault key {kid} unusable: {e}"))
        })?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &key).map_err(|e| ServiceError::Signing(e.to_string()))
    }
}

/// Decodes a token and returns its claims WITHOUT validating the
/// signature.
///
/// This is a mock-only affordance for local development: inbound tokens
/// are trusted as-is so the service never needs the counterparties' real
/// keys. A production token service must never expose this operation.
pub fn decode_unsafe(token: &str) -> Result<TokenClaims, ServiceError> {
    let mut validation = Validation::new(Algorithm::ES256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation.algorithms = vec![Algorithm::ES256, Algorithm::RS256];

    // the decoding key is never consulted with signature validation off
    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ServiceError::Decode(e.to_string()))?;
    Ok(data.claims)
}

fn with_default_times(mut claims: TokenClaims) -> TokenClaims {
    claims.nbf.get_or_insert(MOCK_NOT_BEFORE);
    claims.iat.get_or_insert(MOCK_ISSUED_AT);
    claims.exp.get_or_insert(MOCK_EXPIRY);
    claims
}
