// src/models/claims.rs
//! JWT claim set used by the mock Secure Token Service.
//!
//! All tokens minted by this service share one explicit claims structure
//! instead of ad hoc JSON maps, so optional claims like `scope`, the
//! re-embedded `token` and the correlation id are tagged fields rather
//! than string lookups.

use crate::models::credential::{VerifiableCredential, VerifiablePresentation};
use serde::{Deserialize, Serialize};

/// Claim set of a token issued (or decoded) by the mock STS.
///
/// # Fields
/// - `iss`/`sub`/`aud`: participant DIDs
/// - `nbf`/`iat`/`exp`: time claims, filled with the fixed mock epoch
///   values by the token signer when left unset
/// - `scope`: space-joined credential type names of a grant
/// - `token`: a re-embedded serialized token representing a prior grant
/// - `correlation_id`: one-time id linking a grant to its redemption,
///   serialized under the `token_id` wire name
/// - `jti`: token id carried through on the refresh path
/// - `vc`/`vp`: embedded verifiable credential / presentation documents
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenClaims {
    /// DID of the token issuer
    pub iss: String,

    /// DID of the token subject
    pub sub: String,

    /// DID of the token audience
    pub aud: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Serialized prior token, re-embedded on grants with a scope and on
    /// refreshed access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Correlation id of the grant/sign exchange (`token_id` on the wire).
    #[serde(rename = "token_id", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vc: Option<VerifiableCredential>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vp: Option<VerifiablePresentation>,
}

impl TokenClaims {
    /// Creates a claim set carrying only the participant triple; all
    /// optional claims start out unset.
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        TokenClaims {
            iss: issuer.into(),
            sub: subject.into(),
            aud: audience.into(),
            ..TokenClaims::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_claims_are_omitted() {
        let claims = TokenClaims::new("did:web:a", "did:web:a", "did:web:b");
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["iss"], "did:web:a");
        assert_eq!(json["aud"], "did:web:b");
        assert!(json.get("scope").is_none());
        assert!(json.get("token_id").is_none());
        assert!(json.get("vc").is_none());
    }

    #[test]
    fn test_correlation_id_wire_name() {
        let mut claims = TokenClaims::new("did:web:a", "did:web:a", "did:web:b");
        claims.correlation_id = Some("abc-123".to_string());
        let json = serde_json::to_value(&claims).unwrap();

        // wire format uses "token_id", not the field name
        assert_eq!(json["token_id"], "abc-123");
        assert!(json.get("correlation_id").is_none());

        let parsed: TokenClaims = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.correlation_id.as_deref(), Some("abc-123"));
    }
}
