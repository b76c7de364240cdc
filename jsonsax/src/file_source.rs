// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::byte_source::{ByteSource, SourceError, SourceErrorKind};

/// A [`ByteSource`] reading a file from disk.
///
/// The file is opened on the first `fill()` and closed as soon as it reports
/// end of input, fails, or the source is dropped.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    file: Option<File>,
    finished: bool,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying file handle is currently held.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn open(&mut self) -> Result<&mut File, SourceError> {
        if self.file.is_none() {
            let file = File::open(&self.path).map_err(|e| {
                SourceError::new(
                    SourceErrorKind::Open,
                    format!("{}: {e}", self.path.display()),
                )
            })?;
            log::debug!("opened {}", self.path.display());
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| SourceError::new(SourceErrorKind::Open, "file handle missing"))
    }
}

impl ByteSource for FileSource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.finished {
            return Ok(0);
        }
        let result = loop {
            match self.open()?.read(buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        match result {
            Ok(0) => {
                self.finished = true;
                self.file = None;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                self.finished = true;
                self.file = None;
                Err(SourceError::io(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "jsonsax-file-source-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test_log::test]
    fn test_opens_lazily_and_closes_at_end() {
        let path = scratch_file("lazy.json", b"[1,2,3]");
        let mut source = FileSource::new(&path);
        assert!(!source.is_open());

        let mut buf = [0u8; 4];
        assert_eq!(source.fill(&mut buf), Ok(4));
        assert!(source.is_open());
        assert_eq!(&buf, b"[1,2");
        assert_eq!(source.fill(&mut buf), Ok(3));
        assert_eq!(source.fill(&mut buf), Ok(0));
        assert!(!source.is_open());
        assert_eq!(source.fill(&mut buf), Ok(0));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let mut source = FileSource::new("/definitely/not/here.json");
        let err = source.fill(&mut [0u8; 8]).unwrap_err();
        assert_eq!(err.kind(), SourceErrorKind::Open);
        assert!(err.message().contains("here.json"));
        assert!(!source.is_open());
    }
}
