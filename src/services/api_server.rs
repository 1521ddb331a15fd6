// src/services/api_server.rs
//! API Server for the mock IAM service.
//!
//! This module provides the HTTP interface of the mock, built using Axum:
//! - POST /sts: grant-access / sign-token exchange
//! - POST /presentations/query: verifiable presentation query
//! - GET  /:resolve_name/*did_path: identity document resolution
//! - POST /edr-log: telemetry sink for collaborating connectors

use crate::error::ServiceError;
use crate::models::credential::PresentationResponseMessage;
use crate::models::did::DidDocument;
use crate::services::credential_service::CredentialService;
use crate::services::did_resolver::DidResolver;
use crate::services::token_service::{StsRequest, StsService};
use crate::utils::jwt::decode_unsafe;
use axum::{
    extract::{Json, Path, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

// API request and response structures

/// Response of the STS endpoint carrying the issued bearer token
#[derive(Serialize, Deserialize)]
struct StsResponse {
    jwt: String,
}

/// Request payload of the presentation query
#[derive(Serialize, Deserialize)]
struct PresentationQueryRequest {
    /// Colon-delimited scope triples, `namespace:credential:access`
    scope: Vec<String>,
}

/// Acknowledgement returned by the telemetry endpoint
#[derive(Serialize, Deserialize)]
struct EdrLogResponse {
    message: String,
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Handler for the grant/sign token exchange
    sts: Arc<StsService>,

    /// Builder for credential and presentation tokens
    credentials: Arc<CredentialService>,

    /// Resolver for participant identity documents
    resolver: Arc<DidResolver>,
}

impl ApiServer {
    /// Creates a new instance of the API server
    pub fn new(
        sts: Arc<StsService>,
        credentials: Arc<CredentialService>,
        resolver: Arc<DidResolver>,
    ) -> Self {
        ApiServer {
            sts,
            credentials,
            resolver,
        }
    }

    /// Configures all API routes over the shared state
    pub fn router(&self) -> Router {
        Router::new()
            .route("/sts", post(Self::sts_handler))
            .route("/presentations/query", post(Self::query_presentation_handler))
            .route("/edr-log", post(Self::edr_log_handler))
            .route("/:resolve_name/*did_path", get(Self::did_document_handler))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests
    pub async fn run(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Issues tokens for the two-phase STS exchange
    ///
    /// # Endpoint
    /// POST /sts
    ///
    /// # Request Body
    /// Either `{"grantAccess": {...}}` or `{"signToken": {...}}`
    ///
    /// # Responses
    /// - 200 OK: `{"jwt": "<token>"}`
    /// - 400 Bad Request: neither branch present, malformed token, or
    ///   unknown/consumed correlation id
    async fn sts_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<StsRequest>,
    ) -> Result<Json<StsResponse>, ServiceError> {
        let jwt = match (payload.grant_access, payload.sign_token) {
            (Some(grant), _) => {
                info!("CALLED /sts for GRANT ACCESS REQUEST");
                state.sts.grant_access(&grant)?
            }
            (None, Some(sign)) => {
                info!("CALLED /sts for SIGN TOKEN REQUEST");
                state.sts.sign_token(&sign)?
            }
            (None, None) => {
                return Err(ServiceError::MalformedRequest(
                    "expected grantAccess or signToken".to_string(),
                ))
            }
        };
        Ok(Json(StsResponse { jwt }))
    }

    /// Provides a Verifiable Presentation for the requested scopes
    ///
    /// # Endpoint
    /// POST /presentations/query
    ///
    /// # Request
    /// Bearer token in the authorization header; body carries the scope
    /// triples. Holder, issuer and audience of the presentation are taken
    /// from the bearer's claims.
    ///
    /// # Responses
    /// - 200 OK: PresentationResponseMessage with one presentation token
    /// - 400 Bad Request: missing/malformed bearer or scope entry
    /// - 404 Not Found: bearer subject not registered
    async fn query_presentation_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<PresentationQueryRequest>,
    ) -> Result<Json<PresentationResponseMessage>, ServiceError> {
        info!("CALLED /presentations/query");
        let requestor = decode_unsafe(bearer_from_headers(&headers)?)?;
        info!(
            "query for issuer {}, subject {}, audience {} with scope {:?}",
            requestor.iss, requestor.sub, requestor.aud, requestor.scope
        );

        let scopes = credential_scopes(&payload.scope)?;
        let presentation = state.credentials.build_presentation_token(
            &requestor.sub,
            &requestor.iss,
            &requestor.aud,
            &scopes,
        )?;
        Ok(Json(PresentationResponseMessage::new(presentation)))
    }

    /// Returns the identity document for the specified participant
    ///
    /// # Endpoint
    /// GET /:resolve_name/*did_path
    ///
    /// Any path below the resolve name is accepted; connectors append
    /// method-specific segments that carry no information in this mock.
    ///
    /// # Responses
    /// - 200 OK: DID resolution document
    /// - 404 Not Found: unknown resolve name
    async fn did_document_handler(
        State(state): State<Arc<ApiServer>>,
        Path((resolve_name, did_path)): Path<(String, String)>,
    ) -> Result<Json<DidDocument>, ServiceError> {
        info!("CALLED /{resolve_name}/{did_path}");
        Ok(Json(state.resolver.resolve_document(&resolve_name)?))
    }

    /// Logs a telemetry payload from a collaborating connector
    ///
    /// # Endpoint
    /// POST /edr-log
    async fn edr_log_handler(Json(payload): Json<serde_json::Value>) -> Json<EdrLogResponse> {
        info!(
            "CALLED /edr-log at {}: {payload}",
            chrono::Utc::now().to_rfc3339()
        );
        Json(EdrLogResponse {
            message: "Data logged successfully".to_string(),
        })
    }
}

/// Extracts the bearer token from the authorization header.
fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, ServiceError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ServiceError::MalformedRequest("authorization bearer header is required".to_string())
        })
}

/// Extracts the credential name from each `namespace:credential:access`
/// scope triple.
fn credential_scopes(scope_entries: &[String]) -> Result<Vec<String>, ServiceError> {
    scope_entries
        .iter()
        .map(|entry| {
            entry.split(':').nth(1).map(str::to_string).ok_or_else(|| {
                ServiceError::MalformedRequest(format!(
                    "scope entry '{entry}' is not a namespace:credential:access triple"
                ))
            })
        })
        .collect()
}
