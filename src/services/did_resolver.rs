// src/services/did_resolver.rs
//! Identity document resolver.
//!
//! Serves a DID resolution document per registered participant. All
//! participants share the same P-256 key pair in this mock, so every
//! document exposes identical key material; only the key identifier
//! varies with the resolved DID. The Credential Service entry is needed
//! as a fallback for connectors resolving the presentation endpoint.

use crate::error::ServiceError;
use crate::models::did::{
    DidDocument, PublicKeyJwk, ServiceEntry, VerificationMethod,
};
use crate::registry::participant_registry::ParticipantRegistry;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePublicKey;
use std::sync::Arc;

/// Fixed resolution document id, mirroring the document served to the
/// connectors.
const DOCUMENT_ID: &str = "http://tx-test.com/7bffc00d-3142-4cf2-a858-57c7493577f1";

/// Context identifier of the resolution document.
const DOCUMENT_CONTEXT: &str = "https://w3id.org/did-resolution/v1";

/// Resolver building identity documents from the shared public key.
pub struct DidResolver {
    /// Registry the resolve names are looked up in
    registry: Arc<ParticipantRegistry>,

    /// Base64url x coordinate of the shared public key (no padding)
    jwk_x: String,

    /// Base64url y coordinate of the shared public key (no padding)
    jwk_y: String,

    /// Endpoint advertised as the CredentialService
    service_endpoint: String,
}

impl DidResolver {
    /// Creates a resolver from the shared P-256 public key.
    ///
    /// The key's affine coordinates are extracted once here, so an
    /// unusable key fails the service at startup.
    ///
    /// # Errors
    /// `KeyResolution` if the PEM cannot be parsed as a P-256 public key.
    pub fn new(
        registry: Arc<ParticipantRegistry>,
        shared_public_key_pem: &str,
        service_endpoint: String,
    ) -> Result<Self, ServiceError> {
        let public_key = p256::PublicKey::from_public_key_pem(shared_public_key_pem)
            .map_err(|e| {
                ServiceError::KeyResolution(format!("shared public key unusable: {e}"))
            })?;
        let point = public_key.to_encoded_point(false);
        let (x, y) = match (point.x(), point.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(ServiceError::KeyResolution(
                    "shared public key has no affine coordinates".to_string(),
                ))
            }
        };

        Ok(DidResolver {
            registry,
            jwk_x: base64::encode_config(x.as_slice(), base64::URL_SAFE_NO_PAD),
            jwk_y: base64::encode_config(y.as_slice(), base64::URL_SAFE_NO_PAD),
            service_endpoint,
        })
    }

    /// Builds the identity document for a participant resolve name.
    ///
    /// # Errors
    /// `UnknownParticipant` if the name is not registered.
    pub fn resolve_document(&self, resolve_name: &str) -> Result<DidDocument, ServiceError> {
        let participant = self
            .registry
            .resolve_by_name(resolve_name)
            .ok_or_else(|| ServiceError::UnknownParticipant(resolve_name.to_string()))?;

        let did = participant.id.clone();
        let kid = format!("{did}#key1");
        Ok(DidDocument {
            service: vec![ServiceEntry {
                id: did.clone(),
                service_type: "CredentialService".to_string(),
                service_endpoint: self.service_endpoint.clone(),
            }],
            verification_method: vec![VerificationMethod {
                id: kid.clone(),
                method_type: "JsonWebKey2020".to_string(),
                controller: did,
                public_key_jwk: PublicKeyJwk {
                    kty: "EC".to_string(),
                    crv: "P-256".to_string(),
                    kid,
                    x: self.jwk_x.clone(),
                    y: self.jwk_y.clone(),
                },
            }],
            authentication: Vec::new(),
            id: DOCUMENT_ID.to_string(),
            context: vec![DOCUMENT_CONTEXT.to_string()],
        })
    }
}
