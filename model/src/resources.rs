use crate::error::{self, Result};
use snafu::ResultExt;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Blueprint-relative asset retrieval, e.g. an instance startup script the
/// blueprint author shipped next to the topology. The host provides the real
/// implementation; [`FileBlueprintResources`] covers the common case of a
/// blueprint unpacked on local disk.
pub trait BlueprintResources: Debug + Send + Sync {
    /// Materialize the asset on local disk and return its path.
    fn download_resource(&self, path: &str) -> Result<PathBuf>;

    /// Fetch the asset's raw bytes.
    fn get_resource(&self, path: &str) -> Result<Vec<u8>>;
}

/// Resolves blueprint-relative paths against a local directory.
#[derive(Clone, Debug)]
pub struct FileBlueprintResources {
    root: PathBuf,
}

impl FileBlueprintResources {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl BlueprintResources for FileBlueprintResources {
    fn download_resource(&self, path: &str) -> Result<PathBuf> {
        let full = self.root.join(path);
        // Probe for existence so a bad path fails here, not at first read.
        std::fs::metadata(&full).context(error::BlueprintResourceReadSnafu { path })?;
        Ok(full)
    }

    fn get_resource(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(self.root.join(path)).context(error::BlueprintResourceReadSnafu { path })
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resource_is_an_error() {
        let resources = FileBlueprintResources::new("/nonexistent-blueprint-root");
        assert!(resources.get_resource("scripts/startup.sh").is_err());
        assert!(resources.download_resource("scripts/startup.sh").is_err());
    }
}
