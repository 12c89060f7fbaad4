/// Version and build information embedded at compile time
use serde::Serialize;

/// Build and version information
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Package version from Cargo.toml
    pub version: &'static str,
    /// Git commit hash (short)
    pub git_hash: &'static str,
    /// Git tag (if on a tagged commit)
    pub git_tag: &'static str,
    /// Build timestamp (ISO 8601 format)
    pub build_timestamp: &'static str,
}

impl VersionInfo {
    /// Get the current version information
    pub fn get() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            git_tag: env!("GIT_TAG"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
        }
    }

    /// Version string shown in logs and the property sheet, e.g. `0.1.0 (a1b2c3d4)`.
    pub fn display_version(&self) -> String {
        if self.git_tag.is_empty() {
            format!("{} ({})", self.version, self.git_hash)
        } else {
            self.git_tag.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_package() {
        let info = VersionInfo::get();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(!info.display_version().is_empty());
    }
}
