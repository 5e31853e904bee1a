//! Service layer for business logic and orchestration.
//!
//! This module contains the service layer of the application, which sits between the
//! controller and bot layers and the data (repository) layer. Services are responsible for:
//!
//! - **Business Logic**: Verification order, token generation, validity rules
//! - **Orchestration**: Coordinating repository calls and the distribution source
//! - **Domain Models**: Working with domain models rather than DTOs or entity models

pub mod distribution;
pub mod license_token;
pub mod verification;
