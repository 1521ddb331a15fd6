// src/main.rs

//! # Mock IAM Service - Main Entry Point
//!
//! Local-development stand-in for a decentralized trust protocol's
//! identity wallet and Secure Token Service. It issues and redeems
//! grant/sign tokens, answers presentation queries with verifiable
//! presentations, and serves identity documents for the registered
//! participants.
//!
//! This is explicitly a MOCK: inbound token signatures are never
//! verified, all participants share one key pair, and nothing survives a
//! restart. It must never be deployed outside a local test setup.
//!
//! ## Environment Variables
//! - `IAM_MOCK_ADDR`: (Optional) socket address to bind (default: 0.0.0.0:8080)
//! - `IAM_MOCK_KEYS_DIR`: (Optional) directory with the PEM key material (default: keys)
//! - `IAM_MOCK_SERVICE_ENDPOINT`: (Optional) CredentialService endpoint
//!   advertised in identity documents (default: http://mock-util-service:80)

use crate::registry::participant_registry::ParticipantRegistry;
use crate::services::api_server::ApiServer;
use crate::services::credential_service::CredentialService;
use crate::services::did_resolver::DidResolver;
use crate::services::token_service::StsService;
use crate::utils::jwt::TokenSigner;
use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::{env, fs};

// Module declarations (organized by functional domain)
mod error; // Service error type and HTTP mapping
mod models; // Data structures
mod registry; // Participant identity registry
mod services; // Business logic and API
mod utils; // JWT codec

#[cfg(test)]
mod test_support;

/// Reads one PEM file from the key directory.
fn read_key(keys_dir: &str, file_name: &str) -> anyhow::Result<String> {
    let path = Path::new(keys_dir).join(file_name);
    fs::read_to_string(&path).with_context(|| format!("failed to read key file {}", path.display()))
}

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Read the shared and per-participant key material
/// 3. Initialize registry, token signer and service components
/// 4. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load key material once at startup
    let keys_dir = env::var("IAM_MOCK_KEYS_DIR").unwrap_or_else(|_| "keys".to_string());
    let shared_private_key = read_key(&keys_dir, "private_key.pem")?;
    let shared_public_key = read_key(&keys_dir, "public_key.pem")?;
    let customer_key = read_key(&keys_dir, "customer.key")?;
    let supplier_key = read_key(&keys_dir, "supplier.key")?;

    let service_endpoint = env::var("IAM_MOCK_SERVICE_ENDPOINT")
        .unwrap_or_else(|_| "http://mock-util-service:80".to_string());

    // Initialize core components
    let registry = Arc::new(ParticipantRegistry::with_default_participants(
        customer_key,
        supplier_key,
    ));
    let signer = Arc::new(
        TokenSigner::new(registry.clone(), &shared_private_key)
            .context("failed to initialize token signer")?,
    );
    let sts = Arc::new(StsService::new(signer.clone(), registry.clone()));
    let credentials = Arc::new(CredentialService::new(signer, registry.clone()));
    let resolver = Arc::new(
        DidResolver::new(registry, &shared_public_key, service_endpoint)
            .context("failed to initialize identity document resolver")?,
    );

    // Initialize API Server with all dependencies
    let api_server = ApiServer::new(sts, credentials, resolver);

    // Start the HTTP server
    let addr: SocketAddr = env::var("IAM_MOCK_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .context("invalid IAM_MOCK_ADDR")?;
    info!("mock IAM service running at http://{}", addr);
    info!("available endpoints:");
    info!("- POST /sts");
    info!("- POST /presentations/query");
    info!("- POST /edr-log");
    info!("- GET  /:resolve_name/*did_path");

    api_server.run(addr).await
}
