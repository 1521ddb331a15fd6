// src/registry/participant_registry.rs
//! Static participant registry for the mock dataspace.
//!
//! Maps participant DIDs to their organization identifier, resolve name
//! and (for participants that sign with their own vault key instead of
//! the shared mock key) a dedicated signing key. The registry is populated
//! once at startup and never mutated afterwards; all operations are pure
//! lookups.

use std::collections::HashMap;

/// DID of the trusted credential issuer.
pub const DID_TRUSTED_ISSUER: &str = "did:web:mock-util-service/trusted-issuer";

/// DID of the supplier participant.
pub const DID_SUPPLIER: &str = "did:web:mock-util-service/supplier";

/// DID of the customer participant.
pub const DID_CUSTOMER: &str = "did:web:mock-util-service/customer";

/// Sentinel organization id of the trusted-issuer role.
pub const ORGANIZATION_NONE: &str = "NONE";

/// Per-participant signing key override.
///
/// Participants carrying one of these sign with their own RS256 vault key
/// instead of the shared ES256 mock key. The `vault_kid` is the alias the
/// connector configures as its token verifier public key alias.
#[derive(Debug, Clone)]
pub struct SigningKey {
    /// Vault-style key reference used as the JWT `kid` header
    pub vault_kid: String,

    /// PEM-encoded RSA private key
    pub private_key_pem: String,
}

/// A registered dataspace participant.
#[derive(Debug, Clone)]
pub struct Participant {
    /// DID of the participant, unique across the registry
    pub id: String,

    /// Business partner number, or [`ORGANIZATION_NONE`] for the
    /// trusted-issuer role
    pub organization_id: String,

    /// Short alias used in identity-document lookup paths, unique across
    /// the registry
    pub resolve_name: String,

    /// Signing key override; `None` means the participant signs with the
    /// shared mock key
    pub signing_key: Option<SigningKey>,
}

/// Lookup table over the static participant set.
pub struct ParticipantRegistry {
    /// Participants keyed by DID
    participants: HashMap<String, Participant>,
}

impl ParticipantRegistry {
    /// Builds a registry from the given participants.
    pub fn new(participants: Vec<Participant>) -> Self {
        ParticipantRegistry {
            participants: participants
                .into_iter()
                .map(|participant| (participant.id.clone(), participant))
                .collect(),
        }
    }

    /// Builds the default mock participant set: a trusted issuer signing
    /// with the shared key, plus a customer and a supplier with their own
    /// vault keys.
    ///
    /// # Arguments
    /// * `customer_key_pem` - PEM-encoded RSA private key of the customer
    /// * `supplier_key_pem` - PEM-encoded RSA private key of the supplier
    pub fn with_default_participants(customer_key_pem: String, supplier_key_pem: String) -> Self {
        Self::new(vec![
            Participant {
                id: DID_TRUSTED_ISSUER.to_string(),
                organization_id: ORGANIZATION_NONE.to_string(),
                resolve_name: "trusted-issuer".to_string(),
                signing_key: None,
            },
            Participant {
                id: DID_SUPPLIER.to_string(),
                organization_id: "BPNL1234567890ZZ".to_string(),
                resolve_name: "supplier".to_string(),
                signing_key: Some(SigningKey {
                    vault_kid: "supplier-cert".to_string(),
                    private_key_pem: supplier_key_pem,
                }),
            },
            Participant {
                id: DID_CUSTOMER.to_string(),
                organization_id: "BPNL4444444444XX".to_string(),
                resolve_name: "customer".to_string(),
                signing_key: Some(SigningKey {
                    vault_kid: "customer-cert".to_string(),
                    private_key_pem: customer_key_pem,
                }),
            },
        ])
    }

    /// Looks up a participant by DID.
    pub fn get(&self, did: &str) -> Option<&Participant> {
        self.participants.get(did)
    }

    /// Looks up a participant by its resolve name.
    pub fn resolve_by_name(&self, resolve_name: &str) -> Option<&Participant> {
        self.participants
            .values()
            .find(|participant| participant.resolve_name == resolve_name)
    }

    /// Looks up a participant by its organization id.
    pub fn resolve_by_organization(&self, organization_id: &str) -> Option<&Participant> {
        self.participants
            .values()
            .find(|participant| participant.organization_id == organization_id)
    }

    /// Returns the organization id of the given participant DID.
    pub fn organization_of(&self, did: &str) -> Option<&str> {
        self.participants
            .get(did)
            .map(|participant| participant.organization_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> ParticipantRegistry {
        ParticipantRegistry::with_default_participants(
            "customer-key-pem".to_string(),
            "supplier-key-pem".to_string(),
        )
    }

    #[test]
    fn test_resolve_by_name() {
        let registry = test_registry();

        let customer = registry.resolve_by_name("customer").unwrap();
        assert_eq!(customer.id, DID_CUSTOMER);
        assert_eq!(customer.organization_id, "BPNL4444444444XX");

        assert!(registry.resolve_by_name("unknown-partner").is_none());
    }

    #[test]
    fn test_resolve_by_organization() {
        let registry = test_registry();

        let supplier = registry.resolve_by_organization("BPNL1234567890ZZ").unwrap();
        assert_eq!(supplier.id, DID_SUPPLIER);

        assert!(registry.resolve_by_organization("BPNL0000000000AA").is_none());
    }

    #[test]
    fn test_organization_of() {
        let registry = test_registry();

        assert_eq!(
            registry.organization_of(DID_TRUSTED_ISSUER),
            Some(ORGANIZATION_NONE)
        );
        assert_eq!(registry.organization_of("did:web:nobody"), None);
    }

    #[test]
    fn test_trusted_issuer_has_no_key_override() {
        let registry = test_registry();

        assert!(registry.get(DID_TRUSTED_ISSUER).unwrap().signing_key.is_none());
        assert!(registry.get(DID_CUSTOMER).unwrap().signing_key.is_some());
        assert_eq!(
            registry
                .get(DID_SUPPLIER)
                .unwrap()
                .signing_key
                .as_ref()
                .unwrap()
                .vault_kid,
            "supplier-cert"
        );
    }
}
