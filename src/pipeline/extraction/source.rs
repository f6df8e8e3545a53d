//! Image input abstraction for the extraction pipeline.
//!
//! Receipt uploads arrive in three shapes: an in-memory byte buffer, a
//! seekable upload handle, or a filesystem path. `ImageSource` unifies them
//! behind one `read()` call. Seekable handles are read position-preserving:
//! the cursor is restored afterwards so the caller can reuse the stream
//! (e.g. to save a preview copy of the same upload).

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Blanket trait for seekable readers (upload handles, open files).
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// A receipt image from bytes, a seekable stream, or a path.
pub enum ImageSource<'a> {
    Bytes(&'a [u8]),
    Reader(&'a mut dyn ReadSeek),
    Path(PathBuf),
}

impl<'a> ImageSource<'a> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }

    pub fn from_reader(reader: &'a mut dyn ReadSeek) -> Self {
        Self::Reader(reader)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// Read the full image content.
    ///
    /// For `Reader` sources the stream is read from its current position and
    /// the cursor is restored on a best-effort basis afterwards.
    pub fn read(&mut self) -> io::Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.to_vec()),
            Self::Reader(reader) => {
                let pos = reader.stream_position().ok();
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                if let Some(pos) = pos {
                    let _ = reader.seek(SeekFrom::Start(pos));
                }
                Ok(data)
            }
            Self::Path(path) => std::fs::read(path),
        }
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&Path> for ImageSource<'a> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl<'a> From<PathBuf> for ImageSource<'a> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}
