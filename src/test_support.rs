// src/test_support.rs
//! Shared fixtures for unit tests.
//!
//! Builds the default participant registry and token signer from the mock
//! key material shipped under `keys/`.

use crate::registry::participant_registry::ParticipantRegistry;
use crate::utils::jwt::TokenSigner;
use std::sync::Arc;

/// Shared ES256 private key used by the mock.
pub const SHARED_PRIVATE_KEY_PEM: &str = include_str!("../keys/private_key.pem");

/// Shared ES256 public key exposed by every identity document.
pub const SHARED_PUBLIC_KEY_PEM: &str = include_str!("../keys/public_key.pem");

/// Customer vault RSA key.
pub const CUSTOMER_KEY_PEM: &str = include_str!("../keys/customer.key");

/// Supplier vault RSA key.
pub const SUPPLIER_KEY_PEM: &str = include_str!("../keys/supplier.key");

/// Registry with the default mock participants.
pub fn test_registry() -> Arc<ParticipantRegistry> {
    Arc::new(ParticipantRegistry::with_default_participants(
        CUSTOMER_KEY_PEM.to_string(),
        SUPPLIER_KEY_PEM.to_string(),
    ))
}

/// Token signer over the default registry and shared mock key.
pub fn test_signer() -> Arc<TokenSigner> {
    Arc::new(TokenSigner::new(test_registry(), SHARED_PRIVATE_KEY_PEM).unwrap())
}
