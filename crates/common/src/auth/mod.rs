//! Authentication primitives
//!
//! - **Credentials**: username -> Argon2id hash pairs behind a [`CredentialProvider`]
//! - **Tokens**: stateless HS256 bearer tokens naming the caller's username
//!
//! A caller registers or logs in through the [`CredentialStore`], receives a
//! token from the [`TokenIssuer`], and presents it on every later request.
//! The issuer turns it back into an [`Identity`] without consulting storage.

mod credentials;
mod memory;
mod password;
mod token;

pub use credentials::{CredentialError, CredentialProvider, CredentialStore};
pub use memory::{MemoryCredentialProvider, MemoryCredentialProviderError};
pub use password::{HashCost, PasswordError, PasswordHasher};
pub use token::{
    Claims, Identity, TokenError, TokenIssuer, TokenSecret, DEFAULT_TOKEN_TTL, TOKEN_SECRET_SIZE,
};
