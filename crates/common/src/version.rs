use serde::{Deserialize, Serialize};

/// Compile-time build metadata, populated by `build.rs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildInfo {
    pub build_profile: String,
    pub build_timestamp: String,
    pub version: String,
    pub package_version: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gallery {} ({}, {} build, {})",
            self.package_version, self.version, self.build_profile, self.build_timestamp
        )
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        build_profile: env!("BUILD_PROFILE").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        version: env!("REPO_VERSION").to_string(),
        package_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
