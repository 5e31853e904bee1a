pub use super::license_token::Entity as LicenseToken;
