//! Database repository layer.
//!
//! Repositories use SeaORM entity models internally and return domain models so the
//! service layer never sees entity types.

pub mod license_token;

#[cfg(test)]
mod test;
