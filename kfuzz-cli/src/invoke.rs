//! Delivery of a finished blob to the kernel harness.
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use smol_str::SmolStr;

use crate::error::{AppError, ErrorKind};

/// Per target control file the harness reads its input from.
#[derive(Debug)]
pub struct ControlFile {
    target: SmolStr,
    path: PathBuf,
}

impl ControlFile {
    /// Resolve `<root>/<target>/input`.
    pub fn new(root: impl AsRef<Path>, target: &str) -> Result<Self, AppError> {
        if target.is_empty() || target.contains('/') || target == "." || target == ".." {
            return Err(ErrorKind::Target(target.to_string()).into());
        }

        Ok(Self {
            target: SmolStr::new(target),
            path: root.as_ref().join(target).join("input"),
        })
    }

    pub fn target(&self) -> &str {
        self.target.as_str()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the whole blob to the harness in a single write.
    ///
    /// The harness treats each write as one input, so a partial
    /// write can't be retried.
    pub fn write_blob(&self, blob: &[u8]) -> Result<(), AppError> {
        let mut file = OpenOptions::new().write(true).open(&self.path)?;

        let written = file.write(blob)?;
        if written != blob.len() {
            return Err(ErrorKind::ShortWrite {
                written,
                expected: blob.len(),
            }
            .into());
        }
        file.flush()?;

        log::info!(
            "wrote {} bytes to {} for target '{}'",
            written,
            self.path.display(),
            self.target
        );

        Ok(())
    }
}
