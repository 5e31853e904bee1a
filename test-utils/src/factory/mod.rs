//! Factory methods for creating test data.
//!
//! Factories insert rows with sensible defaults so tests only spell out the fields they
//! care about.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let token = factory::create_license_token(&db).await?;
//!
//! let bound = factory::license_token::LicenseTokenFactory::new(&db)
//!     .client_ip("198.51.100.4")
//!     .script_name("garage")
//!     .build()
//!     .await?;
//! ```

pub mod helpers;
pub mod license_token;

pub use license_token::{create_expired_license_token, create_license_token};
