use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Largest accepted request body; uploads are the only large bodies
    pub max_body_bytes: usize,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, max_upload_bytes: usize) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, max_upload_bytes={}",
            listen_addr,
            max_upload_bytes
        );
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            max_body_bytes: max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        }
    }
}

/// Headroom for multipart boundaries and the text fields that travel
/// alongside the file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
