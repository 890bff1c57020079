use axum::routing::{get, put};
use axum::Router;

use crate::ServiceState;

pub mod list;
pub mod rename;
pub mod upload;

pub use list::ListRequest;
pub use rename::RenameRequest;
pub use upload::{UploadRequest, UploadResponse};

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler).post(upload::handler))
        .route("/:id", put(rename::handler))
        .with_state(state)
}
