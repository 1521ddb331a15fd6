// src/services/credential_service.rs
//! Credential and presentation builder for the mock IAM service.
//!
//! Synthesizes one verifiable-credential token per requested scope and
//! wraps them into a holder-signed verifiable-presentation token. Only
//! membership credentials and framework agreements in version 1.0 are
//! modeled.

use crate::error::ServiceError;
use crate::models::claims::TokenClaims;
use crate::models::credential::{
    CredentialSubject, VerifiableCredential, VerifiablePresentation,
};
use crate::registry::participant_registry::{ParticipantRegistry, DID_TRUSTED_ISSUER};
use crate::utils::jwt::TokenSigner;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Context identifiers of every mock-issued credential.
const CREDENTIAL_CONTEXT: [&str; 4] = [
    "https://www.w3.org/2018/credentials/v1",
    "https://w3id.org/security/suites/jws-2020/v1",
    "https://w3id.org/catenax/credentials",
    "https://w3id.org/vc/status-list/2021/v1",
];

/// Context identifiers of every mock-issued presentation.
const PRESENTATION_CONTEXT: [&str; 2] = [
    "https://www.w3.org/2018/credentials/v1",
    "https://www.w3.org/2018/credentials/examples/v1",
];

/// Fixed issuance date of all mock credentials.
const MOCK_ISSUANCE_DATE: &str = "2021-06-16T18:56:59Z";

/// Scopes with this prefix denote membership credentials, which carry no
/// contract version.
const MEMBERSHIP_SCOPE_PREFIX: &str = "Membership";

/// Contract version stamped into non-membership credentials.
const CONTRACT_VERSION: &str = "1.0";

/// Builder for verifiable credentials and presentations.
pub struct CredentialService {
    /// Codec signing the credential and presentation tokens
    signer: Arc<TokenSigner>,

    /// Registry consulted for the subject's organization id
    registry: Arc<ParticipantRegistry>,
}

impl CredentialService {
    /// Creates a new CredentialService instance.
    pub fn new(signer: Arc<TokenSigner>, registry: Arc<ParticipantRegistry>) -> Self {
        CredentialService { signer, registry }
    }

    /// Builds a plain (unsigned) verifiable credential for one scope.
    ///
    /// Deterministic in everything except the credential id, which is a
    /// fresh `urn:uuid` per call. Non-membership scopes carry the fixed
    /// contract version.
    pub fn build_credential(
        issuer: &str,
        subject: &str,
        organization_id: &str,
        scope: &str,
    ) -> VerifiableCredential {
        info!("create VC for scope {scope}");
        let contract_version = if scope.starts_with(MEMBERSHIP_SCOPE_PREFIX) {
            None
        } else {
            Some(CONTRACT_VERSION.to_string())
        };

        VerifiableCredential {
            context: CREDENTIAL_CONTEXT.iter().map(|c| c.to_string()).collect(),
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            issuer: issuer.to_string(),
            issuance_date: MOCK_ISSUANCE_DATE.to_string(),
            types: vec!["VerifiableCredential".to_string(), scope.to_string()],
            credential_subject: CredentialSubject {
                id: subject.to_string(),
                holder_identifier: organization_id.to_string(),
                contract_version,
            },
        }
    }

    /// Embeds a credential for the given scope in an issuer-signed token.
    ///
    /// The token's `sub` is the issuing authority, not the credential
    /// subject; the subject's DID lives in `credentialSubject.id` of the
    /// embedded document.
    pub fn build_credential_token(
        &self,
        issuer: &str,
        subject: &str,
        audience: &str,
        organization_id: &str,
        scope: &str,
    ) -> Result<String, ServiceError> {
        let mut claims = TokenClaims::new(issuer, issuer, audience);
        claims.vc = Some(Self::build_credential(
            issuer,
            subject,
            organization_id,
            scope,
        ));
        self.signer.issue(claims, issuer)
    }

    /// Builds a presentation token with one trusted-issuer credential per
    /// scope, signed by the subject (the holder's own self-assertion).
    ///
    /// Scope order is preserved and duplicates are not deduplicated.
    ///
    /// # Errors
    /// `UnknownParticipant` if the subject DID is not registered.
    pub fn build_presentation_token(
        &self,
        subject: &str,
        issuer: &str,
        audience: &str,
        scopes: &[String],
    ) -> Result<String, ServiceError> {
        let organization_id = self
            .registry
            .organization_of(subject)
            .ok_or_else(|| ServiceError::UnknownParticipant(subject.to_string()))?
            .to_string();

        let credentials = scopes
            .iter()
            .map(|scope| {
                self.build_credential_token(
                    DID_TRUSTED_ISSUER,
                    subject,
                    audience,
                    &organization_id,
                    scope,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut claims = TokenClaims::new(issuer, subject, audience);
        claims.vp = Some(VerifiablePresentation {
            context: PRESENTATION_CONTEXT.iter().map(|c| c.to_string()).collect(),
            types: vec![
                "VerifiablePresentation".to_string(),
                "CredentialManagerPresentation".to_string(),
            ],
            verifiable_credential: credentials,
        });
        self.signer.issue(claims, subject)
    }
}
