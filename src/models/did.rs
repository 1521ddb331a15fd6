// src/models/did.rs
//! DID resolution document data model.
//!
//! Defines the identity document served for each registered participant,
//! following the [DID Core Specification](https://www.w3.org/TR/did-core/)
//! resolution result shape. In this mock every participant's document
//! exposes the same shared P-256 public key; only the key identifier
//! differs per DID.

use serde::{Deserialize, Serialize};

/// Elliptic-curve public key in JWK form.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicKeyJwk {
    /// Key type, always "EC"
    pub kty: String,

    /// Curve name, always "P-256"
    pub crv: String,

    /// Key identifier, `<did>#key1`
    pub kid: String,

    /// Base64url-encoded x coordinate (no padding)
    pub x: String,

    /// Base64url-encoded y coordinate (no padding)
    pub y: String,
}

/// A single verification method entry of a DID document.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VerificationMethod {
    /// Method identifier, `<did>#key1`
    pub id: String,

    /// Method type, always "JsonWebKey2020"
    #[serde(rename = "type")]
    pub method_type: String,

    /// DID controlling this key
    pub controller: String,

    /// The public key material
    #[serde(rename = "publicKeyJwk")]
    pub public_key_jwk: PublicKeyJwk,
}

/// A service endpoint entry of a DID document.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceEntry {
    /// DID of the participant the service belongs to
    pub id: String,

    /// Service type, always "CredentialService"
    #[serde(rename = "type")]
    pub service_type: String,

    /// Endpoint the connector queries for presentations
    #[serde(rename = "serviceEndpoint")]
    pub service_endpoint: String,
}

/// DID resolution document returned by the identity-document endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DidDocument {
    /// Service endpoints (a single CredentialService entry in this mock)
    pub service: Vec<ServiceEntry>,

    /// Verification methods (a single shared-key entry in this mock)
    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,

    /// Authentication references, unused by the mock
    pub authentication: Vec<String>,

    /// Resolution document identifier
    pub id: String,

    /// JSON-LD context identifiers
    #[serde(rename = "@context")]
    pub context: Vec<String>,
}
