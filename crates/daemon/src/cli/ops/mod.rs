pub mod daemon;
pub mod health;
pub mod images;
pub mod init;
pub mod session;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use images::Images;
pub use init::Init;
pub use session::{Login, Register};
pub use version::Version;
