// src/services/mod.rs
//! Business logic and HTTP API of the mock IAM service.

pub mod api_server;
pub mod credential_service;
pub mod did_resolver;
pub mod token_service;
