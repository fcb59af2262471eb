//! Random-access byte source abstraction.
//!
//! The registry and document loaders need to seek to arbitrary offsets and read a bounded
//! number of bytes from there — for indirect objects located by the xref table, for xref/trailer
//! reconstruction scans, and for stream payloads. This module generalizes that access pattern
//! behind a trait so the rest of the crate isn't hard-wired to `File`.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};

/// A random-access byte source.
///
/// Implementations are not required to be cheap to clone; callers that need concurrent access
/// should open independent readers (as `PdfDocument` does per the single-threaded model in
/// the concurrency notes) rather than share one behind a lock.
pub trait Reader {
    /// Total length of the underlying byte source, in bytes.
    fn len(&mut self) -> Result<u64>;

    /// Whether the source is empty.
    fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read exactly `max_len` bytes starting at `offset`, or fewer if the source ends first.
    fn read_chunk(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>>;

    /// Read the entire source into memory.
    fn read_all(&mut self) -> Result<Vec<u8>>;
}

/// File-backed reader, buffered for the sequential-ish access pattern of object loading.
pub struct FileReader {
    inner: BufReader<File>,
    len: Option<u64>,
}

impl FileReader {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            inner: BufReader::new(file),
            len: None,
        })
    }

    /// Wrap an already-open file.
    pub fn from_file(file: File) -> Self {
        Self {
            inner: BufReader::new(file),
            len: None,
        }
    }
}

impl Reader for FileReader {
    fn len(&mut self) -> Result<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.inner.get_ref().metadata()?.len();
        self.len = Some(len);
        Ok(len)
    }

    fn read_chunk(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>> {
        self.inner.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; max_len];
        let mut read_total = 0;
        loop {
            let n = self.inner.read(&mut buf[read_total..])?;
            if n == 0 {
                break;
            }
            read_total += n;
            if read_total == buf.len() {
                break;
            }
        }
        buf.truncate(read_total);
        Ok(buf)
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        self.inner.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// In-memory reader, useful for tests and for re-parsing buffers already held in memory (e.g.
/// the byte range extracted for a single page).
pub struct MemoryReader {
    inner: Cursor<Vec<u8>>,
}

impl MemoryReader {
    /// Wrap an in-memory byte buffer.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }
}

impl Reader for MemoryReader {
    fn len(&mut self) -> Result<u64> {
        Ok(self.inner.get_ref().len() as u64)
    }

    fn read_chunk(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>> {
        let data = self.inner.get_ref();
        let start = (offset as usize).min(data.len());
        let end = (start + max_len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        Ok(self.inner.get_ref().clone())
    }
}

/// Wraps a `Reader` to abort with [`Error::ReaderAborted`] once a cancellation flag is set.
///
/// Grounded on the crate's general "bounded work" philosophy (decompression-bomb limits,
/// object-cache caps): long-running scans (xref reconstruction over a multi-gigabyte file)
/// should be cooperatively cancellable rather than uninterruptible.
pub struct CancellableReader<R> {
    inner: R,
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl<R: Reader> CancellableReader<R> {
    /// Wrap a reader with a shared cancellation flag.
    pub fn new(inner: R, cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>) -> Self {
        Self { inner, cancelled }
    }

    fn check(&self) -> Result<()> {
        if self.cancelled.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(Error::ReaderAborted("cancelled by caller".to_string()));
        }
        Ok(())
    }
}

impl<R: Reader> Reader for CancellableReader<R> {
    fn len(&mut self) -> Result<u64> {
        self.check()?;
        self.inner.len()
    }

    fn read_chunk(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>> {
        self.check()?;
        self.inner.read_chunk(offset, max_len)
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        self.check()?;
        self.inner.read_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn test_memory_reader_len() {
        let mut r = MemoryReader::new(b"hello world".to_vec());
        assert_eq!(r.len().unwrap(), 11);
    }

    #[test]
    fn test_memory_reader_read_chunk() {
        let mut r = MemoryReader::new(b"hello world".to_vec());
        let chunk = r.read_chunk(6, 5).unwrap();
        assert_eq!(chunk, b"world");
    }

    #[test]
    fn test_memory_reader_read_chunk_past_end() {
        let mut r = MemoryReader::new(b"hello".to_vec());
        let chunk = r.read_chunk(3, 100).unwrap();
        assert_eq!(chunk, b"lo");
    }

    #[test]
    fn test_memory_reader_read_all() {
        let mut r = MemoryReader::new(b"hello world".to_vec());
        assert_eq!(r.read_all().unwrap(), b"hello world");
    }

    #[test]
    fn test_file_reader_roundtrip() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        tmp.write_all(b"%PDF-1.4\nsome bytes here").unwrap();
        let mut r = FileReader::open(tmp.path()).unwrap();
        assert_eq!(r.len().unwrap(), 24);
        let chunk = r.read_chunk(0, 8).unwrap();
        assert_eq!(chunk, b"%PDF-1.4");
    }

    #[test]
    fn test_cancellable_reader_aborts() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut r = CancellableReader::new(MemoryReader::new(b"data".to_vec()), flag.clone());
        assert!(r.read_all().is_ok());
        flag.store(true, std::sync::atomic::Ordering::Relaxed);
        assert!(r.read_all().is_err());
    }
}
