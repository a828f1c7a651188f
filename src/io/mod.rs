//! Band and descriptor file loading for the command-line front end

use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::error::Result;

/// A band payload mapped read-only from disk
pub struct BandFile {
    mmap: Option<Mmap>,
}

impl BandFile {
    /// Maps `path`; an empty file yields an empty payload
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(Self { mmap: None });
        }

        let mmap = unsafe { Mmap::map(&file)? };

        #[cfg(unix)]
        {
            if let Err(e) = mmap.advise(memmap2::Advice::Sequential) {
                debug!(error = %e, "madvise failed");
            }
        }

        debug!(path = %path.as_ref().display(), bytes = len, "mapped band file");
        Ok(Self { mmap: Some(mmap) })
    }

    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

/// Reads a descriptor file as text
pub fn read_descriptor<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
