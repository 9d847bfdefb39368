//! CNPJ Lookup API Library
//!
//! Looks up Brazilian company registrations (CNPJ) on public third-party APIs
//! and normalizes their differing JSON shapes into one canonical record.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Identifier, normalization and resolution logic.
//! - `integrations`: Upstream CNPJ APIs.
//! - `cnpj`: Identifier parsing and formatting.
//! - `config`: Configuration management.
//! - `docs`: OpenAPI/Swagger endpoints.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Canonical record and request models.
//! - `normalizer`: Upstream payload to canonical record mapping.
//! - `resolver`: Single- and multi-source lookup orchestration.
//! - `sources`: Upstream adapter definitions and HTTP client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod cnpj;
pub mod config;
pub mod docs;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod resolver;
pub mod sources;
