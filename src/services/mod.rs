pub mod account_service;
pub use account_service::{CredentialError, CredentialService};

pub mod account_service_impl;
pub use account_service_impl::{ApiKeyGenerator, SeaOrmCredentialService};
