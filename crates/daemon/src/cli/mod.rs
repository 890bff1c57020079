pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Daemon, Health, Images, Init, Login, Register, Version};
