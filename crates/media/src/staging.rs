//! Temp-file staging for uploads that decoders read from disk

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::video::has_gif_magic;
use crate::MediaError;

/// Upload bytes written to a uniquely named temp file
///
/// The file is removed when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write an upload to a fresh temp file
    pub fn write(bytes: &[u8]) -> Result<Self, MediaError> {
        let suffix = if has_gif_magic(bytes) { ".gif" } else { ".mp4" };
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(suffix)
            .tempfile()?;

        file.write_all(bytes)?;
        file.flush()?;

        debug!("Staged {} bytes at {}", bytes.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
