//! Shared test utilities for catalog and auth integration tests
#![allow(dead_code)]

use common::auth::{
    CredentialStore, HashCost, MemoryCredentialProvider, PasswordHasher, TokenIssuer, TokenSecret,
    DEFAULT_TOKEN_TTL,
};
use common::catalog::{CatalogProvider, ImageName, ImageRecord, MemoryCatalogProvider, UserEntry};

/// Credential store over memory, with the cheapest hash parameters
pub fn credential_store() -> CredentialStore<MemoryCredentialProvider> {
    let hasher = PasswordHasher::new(HashCost::minimal()).unwrap();
    CredentialStore::new(MemoryCredentialProvider::new(), hasher)
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&TokenSecret::generate(), DEFAULT_TOKEN_TTL)
}

/// Catalog with directory entries for alice and bob
pub async fn seeded_catalog() -> MemoryCatalogProvider {
    let catalog = MemoryCatalogProvider::new();
    for name in ["alice", "bob"] {
        catalog
            .add_user(&UserEntry::new(name, name, format!("{}@example.com", name)))
            .await
            .unwrap();
    }
    catalog
}

pub async fn add_image(catalog: &MemoryCatalogProvider, name: &str, owner: &str) -> ImageRecord {
    catalog
        .create(
            &ImageName::parse(name).unwrap(),
            owner,
            &format!("/uploads/{}.png", name.replace(' ', "-")),
        )
        .await
        .unwrap()
}
