use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use super::RangeReader;
use crate::error::IoError;

/// Range reader over a local file.
///
/// Reads go through `&File`, which implements `Read` and `Seek`, so the
/// reader can be shared immutably by the slide parser.
#[derive(Debug)]
pub struct FileRangeReader {
    file: File,
    size: u64,
    identifier: String,
}

impl FileRangeReader {
    /// Open `path` for range reads.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let identifier = path.display().to_string();

        let file = File::open(path).map_err(|e| IoError::from_std(&identifier, e))?;
        let size = file
            .metadata()
            .map_err(|e| IoError::from_std(&identifier, e))?
            .len();

        Ok(Self {
            file,
            size,
            identifier,
        })
    }
}

impl RangeReader for FileRangeReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.check_range(offset, len)?;

        let mut handle = &self.file;
        let mut buf = vec![0u8; len];
        handle
            .seek(SeekFrom::Start(offset))
            .and_then(|_| handle.read_exact(&mut buf))
            .map_err(|e| IoError::from_std(&self.identifier, e))?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
