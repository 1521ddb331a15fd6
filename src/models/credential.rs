// src/models/credential.rs
//! Verifiable Credential and Verifiable Presentation data models.
//!
//! Defines the W3C-shaped documents the mock embeds into JWTs, following
//! the [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/).
//! Credentials are never transmitted unsigned; they only appear under the
//! `vc` claim of an issuer-signed token, and presentations under the `vp`
//! claim of a holder-signed token.

use serde::{Deserialize, Serialize};

/// Subject section of a Verifiable Credential.
///
/// `id` carries the DID the credential is about, `holderIdentifier` the
/// subject's business partner number. `contractVersion` is present for
/// every scope except membership credentials.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CredentialSubject {
    /// DID of the credential subject
    pub id: String,

    /// Business partner number of the subject organization
    #[serde(rename = "holderIdentifier")]
    pub holder_identifier: String,

    /// Framework agreement version, absent on membership credentials
    #[serde(rename = "contractVersion", skip_serializing_if = "Option::is_none")]
    pub contract_version: Option<String>,
}

/// A Verifiable Credential according to W3C standards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerifiableCredential {
    /// JSON-LD context identifiers
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Unique URI identifier for the credential
    /// Example: "urn:uuid:123e4567-e89b-12d3-a456-426614174000"
    pub id: String,

    /// DID of the credential issuer
    pub issuer: String,

    /// Issuance timestamp (fixed value in this mock)
    #[serde(rename = "issuanceDate")]
    pub issuance_date: String,

    /// Credential types: "VerifiableCredential" plus the requested scope
    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// Claims about the subject
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,
}

/// A Verifiable Presentation wrapping one credential token per requested
/// scope, in request order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerifiablePresentation {
    /// JSON-LD context identifiers
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Presentation types
    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// Serialized credential tokens, one per scope
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<String>,
}

/// Response envelope returned by the presentation query endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PresentationResponseMessage {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(rename = "@type")]
    pub message_type: String,

    /// Serialized presentation tokens (exactly one in this mock)
    pub presentation: Vec<String>,
}

impl PresentationResponseMessage {
    /// Wraps a single presentation token into the response envelope.
    pub fn new(presentation_token: String) -> Self {
        PresentationResponseMessage {
            context: vec!["https://w3id.org/tractusx-trust/v0.8".to_string()],
            message_type: "PresentationResponseMessage".to_string(),
            presentation: vec![presentation_token],
        }
    }
}
