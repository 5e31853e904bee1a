//! SeaORM entities for the license token store.

pub mod prelude;

pub mod license_token;
