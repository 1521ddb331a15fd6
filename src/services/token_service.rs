// src/services/token_service.rs
//! Secure Token Service protocol handler.
//!
//! Implements the two-phase grant-access / sign-token exchange. A grant
//! mints a bearer token carrying a fresh correlation id and records the
//! token under that id; the matching sign-token request consumes the entry
//! exactly once and re-issues the access token. Sign-token requests
//! without a correlation id are treated as a refresh of a previously
//! issued access token.

use crate::error::ServiceError;
use crate::models::claims::TokenClaims;
use crate::registry::participant_registry::ParticipantRegistry;
use crate::utils::jwt::{decode_unsafe, TokenSigner};
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Grant-access branch of an STS request.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    /// DID of the consumer requesting access
    pub consumer_did: Option<String>,

    /// DID of the provider access is requested for
    pub provider_did: Option<String>,

    /// Credential type names joined into the token's scope
    pub credential_types: Option<Vec<String>>,
}

/// Sign-token branch of an STS request.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignTokenRequest {
    /// Previously issued token being presented back
    pub token: String,

    /// DID that signs the resulting access token
    pub issuer: String,
}

/// Request body of the STS endpoint: exactly one of the two branches.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StsRequest {
    pub grant_access: Option<GrantAccessRequest>,
    pub sign_token: Option<SignTokenRequest>,
}

/// Handler for the grant-access / sign-token exchange.
///
/// The correlation table lives for the process lifetime; entries are
/// created on grant and removed on their single redemption. The
/// find-and-remove under one lock keeps concurrent redemptions of the
/// same grant from both succeeding.
pub struct StsService {
    /// Codec issuing the exchanged tokens
    signer: Arc<TokenSigner>,

    /// Registry used to map organization ids back to DIDs on refresh
    registry: Arc<ParticipantRegistry>,

    /// Correlation id -> serialized grant token
    correlations: Mutex<HashMap<String, String>>,
}

impl StsService {
    /// Creates a new StsService with an empty correlation table.
    pub fn new(signer: Arc<TokenSigner>, registry: Arc<ParticipantRegistry>) -> Self {
        StsService {
            signer,
            registry,
            correlations: Mutex::new(HashMap::new()),
        }
    }

    /// Handles a grant-access request.
    ///
    /// Generates a fresh correlation id, issues a consumer-signed bearer
    /// token carrying it, and records the token for the later sign-token
    /// redemption.
    ///
    /// # Errors
    /// `MalformedRequest` if `consumerDid` or `providerDid` is missing.
    pub fn grant_access(&self, request: &GrantAccessRequest) -> Result<String, ServiceError> {
        let consumer = request.consumer_did.as_deref().ok_or_else(|| {
            ServiceError::MalformedRequest("grantAccess.consumerDid is required".to_string())
        })?;
        let provider = request.provider_did.as_deref().ok_or_else(|| {
            ServiceError::MalformedRequest("grantAccess.providerDid is required".to_string())
        })?;

        let correlation_id = Uuid::new_v4().to_string();
        let mut claims = TokenClaims::new(consumer, consumer, provider);
        claims.correlation_id = Some(correlation_id.clone());
        info!("grant access for issuer {consumer}, audience {provider}");

        let scope = request
            .credential_types
            .as_ref()
            .filter(|types| !types.is_empty())
            .map(|types| types.join(" "));
        match scope {
            Some(scope) => {
                claims.scope = Some(scope);
                // the grant embeds a signed copy of itself
                claims.token = Some(self.signer.issue(claims.clone(), consumer)?);
            }
            None => info!("no scope given for self-issued token, skipping token claim"),
        }

        let token = self.signer.issue(claims, consumer)?;
        self.correlations
            .lock()
            .unwrap()
            .insert(correlation_id, token.clone());
        Ok(token)
    }

    /// Handles a sign-token request.
    ///
    /// Tokens carrying a correlation id redeem their recorded grant;
    /// tokens without one are refreshed.
    pub fn sign_token(&self, request: &SignTokenRequest) -> Result<String, ServiceError> {
        let presented = decode_unsafe(&request.token)?;
        match presented.correlation_id.as_deref() {
            Some(correlation_id) => self.redeem_grant(correlation_id, &request.issuer),
            None => self.refresh(&presented),
        }
    }

    /// Consumes a recorded grant and re-issues it as an access token
    /// signed by the requested issuer.
    fn redeem_grant(&self, correlation_id: &str, issuer: &str) -> Result<String, ServiceError> {
        // single atomic find-and-remove: a second redemption of the same
        // grant must not observe the entry
        let granted = self
            .correlations
            .lock()
            .unwrap()
            .remove(correlation_id)
            .ok_or_else(|| ServiceError::CorrelationNotFound(correlation_id.to_string()))?;

        let granted = decode_unsafe(&granted)?;
        info!(
            "redeem grant for issuer {}, subject {}, audience {}",
            granted.iss, granted.sub, granted.aud
        );
        let claims = TokenClaims::new(&granted.iss, &granted.sub, &granted.aud);
        self.signer.issue(claims, issuer)
    }

    /// Refreshes an access token that carries no correlation id.
    ///
    /// Issuer and subject swap roles: the refreshed token is issued by the
    /// participant behind the presented token's audience organization and
    /// addressed to the one behind its subject organization. The original
    /// `jti`/`iat`/`exp` are carried over, and a vault-signed copy is
    /// embedded under the `token` claim.
    fn refresh(&self, presented: &TokenClaims) -> Result<String, ServiceError> {
        let issuer = self
            .registry
            .resolve_by_organization(&presented.aud)
            .ok_or_else(|| ServiceError::UnknownParticipant(presented.aud.clone()))?;
        let audience = self
            .registry
            .resolve_by_organization(&presented.sub)
            .ok_or_else(|| ServiceError::UnknownParticipant(presented.sub.clone()))?;

        let mut claims = TokenClaims::new(&issuer.id, &issuer.id, &audience.id);
        claims.jti = presented.jti.clone();
        claims.iat = presented.iat;
        claims.exp = presented.exp;
        info!(
            "refresh token for issuer {}, audience {}",
            issuer.id, audience.id
        );

        let key = issuer.signing_key.as_ref().ok_or_else(|| {
            ServiceError::KeyResolution(format!("no vault key registered for {}", issuer.id))
        })?;
        claims.token = Some(self.signer.issue_with_explicit_key(
            claims.clone(),
            &key.vault_kid,
            &key.private_key_pem,
        )?);
        self.signer.issue(claims, &issuer.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::participant_registry::{DID_CUSTOMER, DID_SUPPLIER};
    use crate::test_support;
    use crate::utils::jwt::{MOCK_EXPIRY, MOCK_ISSUED_AT};

    fn test_service() -> StsService {
        StsService::new(test_support::test_signer(), test_support::test_registry())
    }

    fn grant_request(credential_types: Option<Vec<&str>>) -> GrantAccessRequest {
        GrantAccessRequest {
            consumer_did: Some(DID_CUSTOMER.to_string()),
            provider_did: Some(DID_SUPPLIER.to_string()),
            credential_types: credential_types
                .map(|types| types.into_iter().map(str::to_string).collect()),
        }
    }

    #[test]
    fn test_grant_carries_scope_and_correlation_id() {
        let service = test_service();

        let token = service
            .grant_access(&grant_request(Some(vec!["MembershipCredential", "PcfCredential"])))
            .unwrap();
        let claims = decode_unsafe(&token).unwrap();

        assert_eq!(claims.iss, DID_CUSTOMER);
        assert_eq!(claims.sub, DID_CUSTOMER);
        assert_eq!(claims.aud, DID_SUPPLIER);
        assert_eq!(claims.scope.as_deref(), Some("MembershipCredential PcfCredential"));
        assert!(claims.correlation_id.is_some());
        assert!(claims.token.is_some());
    }

    #[test]
    fn test_grant_without_credential_types_has_no_scope() {
        let service = test_service();

        let token = service.grant_access(&grant_request(None)).unwrap();
        let claims = decode_unsafe(&token).unwrap();

        assert!(claims.scope.is_none());
        assert!(claims.token.is_none());
        assert!(claims.correlation_id.is_some());
    }

    #[test]
    fn test_grant_missing_consumer_did_is_rejected() {
        let service = test_service();
        let mut request = grant_request(None);
        request.consumer_did = None;

        let result = service.grant_access(&request);
        assert!(matches!(result, Err(ServiceError::MalformedRequest(_))));
    }

    #[test]
    fn test_concurrent_grants_use_distinct_correlation_ids() {
        let service = test_service();

        let first = decode_unsafe(&service.grant_access(&grant_request(None)).unwrap()).unwrap();
        let second = decode_unsafe(&service.grant_access(&grant_request(None)).unwrap()).unwrap();

        assert_ne!(first.correlation_id, second.correlation_id);
    }

    #[test]
    fn test_grant_sign_round_trip_consumes_the_correlation() {
        let service = test_service();

        let grant_token = service
            .grant_access(&grant_request(Some(vec!["MembershipCredential"])))
            .unwrap();
        let sign_request = SignTokenRequest {
            token: grant_token,
            issuer: DID_SUPPLIER.to_string(),
        };

        let access_token = service.sign_token(&sign_request).unwrap();
        let access = decode_unsafe(&access_token).unwrap();

        // participant triple of the grant is preserved
        assert_eq!(access.iss, DID_CUSTOMER);
        assert_eq!(access.sub, DID_CUSTOMER);
        assert_eq!(access.aud, DID_SUPPLIER);
        assert!(access.correlation_id.is_none());

        // the correlation was consumed: a second redemption must fail
        let result = service.sign_token(&sign_request);
        assert!(matches!(result, Err(ServiceError::CorrelationNotFound(_))));
    }

    #[test]
    fn test_sign_token_with_unknown_correlation_is_rejected() {
        let service = test_service();

        // a token that carries a correlation id nobody granted
        let mut claims = TokenClaims::new(DID_CUSTOMER, DID_CUSTOMER, DID_SUPPLIER);
        claims.correlation_id = Some("never-granted".to_string());
        let token = test_support::test_signer().issue(claims, DID_CUSTOMER).unwrap();

        let result = service.sign_token(&SignTokenRequest {
            token,
            issuer: DID_SUPPLIER.to_string(),
        });
        assert!(matches!(result, Err(ServiceError::CorrelationNotFound(_))));
    }

    #[test]
    fn test_refresh_swaps_roles_and_embeds_vault_token() {
        let service = test_service();

        // an access token as the connector presents it on refresh:
        // organization ids in subject/audience, no correlation id
        let mut presented = TokenClaims::new(
            "BPNL4444444444XX",
            "BPNL4444444444XX",
            "BPNL1234567890ZZ",
        );
        presented.jti = Some("f7fe5a53-4b5b-4b9a-b3b0-6d1b6f9f1f9a".to_string());
        presented.iat = Some(1_700_000_000);
        presented.exp = Some(1_700_000_600);
        let token = test_support::test_signer()
            .issue(presented, "BPNL4444444444XX")
            .unwrap();

        let refreshed = service
            .sign_token(&SignTokenRequest {
                token,
                issuer: DID_SUPPLIER.to_string(),
            })
            .unwrap();
        let claims = decode_unsafe(&refreshed).unwrap();

        // issuer side comes from the audience organization and vice versa
        assert_eq!(claims.iss, DID_SUPPLIER);
        assert_eq!(claims.sub, DID_SUPPLIER);
        assert_eq!(claims.aud, DID_CUSTOMER);

        // the embedded vault-signed copy carries the original jti/iat/exp
        let embedded = decode_unsafe(&claims.token.unwrap()).unwrap();
        assert_eq!(
            embedded.jti.as_deref(),
            Some("f7fe5a53-4b5b-4b9a-b3b0-6d1b6f9f1f9a")
        );
        assert_eq!(embedded.iat, Some(1_700_000_000));
        assert_eq!(embedded.exp, Some(1_700_000_600));
    }

    #[test]
    fn test_refresh_for_unknown_organization_is_rejected() {
        let service = test_service();

        let presented = TokenClaims::new("X", "X", "BPNL9999999999YY");
        let token = test_support::test_signer().issue(presented, "X").unwrap();

        let result = service.sign_token(&SignTokenRequest {
            token,
            issuer: DID_SUPPLIER.to_string(),
        });
        assert!(matches!(result, Err(ServiceError::UnknownParticipant(_))));
    }

    #[test]
    fn test_redeemed_token_gets_fresh_mock_times() {
        let service = test_service();

        let grant_token = service.grant_access(&grant_request(None)).unwrap();
        let access_token = service
            .sign_token(&SignTokenRequest {
                token: grant_token,
                issuer: DID_SUPPLIER.to_string(),
            })
            .unwrap();

        let access = decode_unsafe(&access_token).unwrap();
        assert_eq!(access.iat, Some(MOCK_ISSUED_AT));
        assert_eq!(access.exp, Some(MOCK_EXPIRY));
    }
}
