//! Server-side API backend and business logic.
//!
//! This module contains the license verification service and the Discord admin bot that
//! manages the token store. The backend uses Axum as the web framework, SeaORM for the
//! token store, reqwest for fetching script files from the distribution source, and
//! Serenity for the admin bot.
//!
//! # Architecture
//!
//! - **Controller Layer** (`controller/`) - HTTP request handlers and DTO conversion
//! - **Service Layer** (`service/`) - Verification, token management and script distribution
//! - **Data Layer** (`data/`) - Database operations and entity-to-domain model conversion
//! - **Model Layer** (`model/`) - Domain models and operation-specific parameter types
//! - **Error Layer** (`error/`) - Application error types and HTTP response mapping
//! - **Middleware** (`middleware/`) - Request extractors such as the client address
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based application configuration
//! - **State** (`state`) - Shared application state (DB, distribution service)
//! - **Startup** (`startup`) - Initialization of database, HTTP client and distribution source
//! - **Router** (`router`) - Axum route configuration and API documentation
//! - **Bot** (`bot/`) - Discord admin panel for issuing and revoking tokens
//!
//! # Request Flow
//!
//! 1. **Router** receives the verification request
//! 2. **Middleware** resolves the caller's address
//! 3. **Controller** converts the DTO to a param and calls the verification service
//! 4. **Service** checks the token against the store, then asks the distribution service
//!    for an update when the caller runs an outdated version
//! 5. **Controller** converts the verified license to a DTO and returns it

pub mod bot;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod router;
pub mod service;
pub mod startup;
pub mod state;
