/**
 * Ownership checks in front of catalog
 *  mutations.
 */
pub mod access;
/**
 * Credential storage, password hashing
 *  and stateless bearer tokens.
 */
pub mod auth;
/**
 * Image records, the user directory they
 *  point at, and the denormalized view
 *  that joins the two.
 */
pub mod catalog;
/**
 * Client-side live search. Keeps overlapping
 *  queries from clobbering each other.
 */
pub mod search;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::access::{AccessError, Authorized, OwnershipGate};
    pub use crate::auth::{
        CredentialError, CredentialProvider, CredentialStore, HashCost, Identity, PasswordHasher,
        TokenError, TokenIssuer, TokenSecret,
    };
    pub use crate::catalog::{
        CatalogError, CatalogProvider, ImageFilter, ImageId, ImageName, ImageRecord, ImageView,
        NameError, UserEntry,
    };
    pub use crate::search::{QuerySequencer, SearchSession, SearchTransport};
    pub use crate::version::build_info;
}
