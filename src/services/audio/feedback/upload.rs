use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use crate::services::audio::{error::AudioError, port::SampleSource};

/// Open sample file plus the byte cursor of one upload.
///
/// Dropped (and the file closed) as soon as the upload finishes or fails.
#[derive(Debug)]
pub struct SampleUpload {
    path: PathBuf,
    file: File,
    declared_len: usize,
    written: usize,
}

impl SampleUpload {
    /// Open `path` and take its current length as the declared length.
    ///
    /// # Errors
    /// Returns [`AudioError::Resource`] if the file cannot be opened or is empty
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let resource = |details: String| AudioError::Resource {
            path: path.to_path_buf(),
            details,
        };

        let file = File::open(path).map_err(|e| resource(e.to_string()))?;
        let metadata = file.metadata().map_err(|e| resource(e.to_string()))?;
        let declared_len =
            usize::try_from(metadata.len()).map_err(|e| resource(e.to_string()))?;

        if declared_len == 0 {
            return Err(resource(String::from("sample file is empty")));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            declared_len,
            written: 0,
        })
    }

    /// Path of the sample file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes handed out so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl SampleSource for SampleUpload {
    fn declared_len(&self) -> usize {
        self.declared_len
    }

    fn pull(&mut self, requested: usize) -> io::Result<Vec<u8>> {
        let remaining = self.declared_len - self.written;
        let want = requested.min(remaining);

        let mut chunk = vec![0; want];
        let mut filled = 0;
        while filled < want {
            match self.file.read(&mut chunk[filled..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "{} ended after {} of {} bytes",
                            self.path.display(),
                            self.written + filled,
                            self.declared_len
                        ),
                    ));
                }
                Ok(read) => filled += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        self.written += filled;
        Ok(chunk)
    }

    fn is_complete(&self) -> bool {
        self.written == self.declared_len
    }
}
