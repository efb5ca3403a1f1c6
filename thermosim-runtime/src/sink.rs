//! Newline delimited JSON output.
//!
//! Every reading is written as one JSON object followed by a newline, in the
//! order the readings are given.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{core::Reading, Error, Result};

const WRITE_BUFFER_SIZE: usize = 4096;

/// Reading writer.
pub struct NdjsonSink<W: Write> {
    writer: BufWriter<W>,
    path: PathBuf,
    count: usize,
}

impl<W: Write> NdjsonSink<W> {
    /// Construct a sink writing to a stream.
    pub fn new(writer: W) -> Self {
        Self::with_path(writer, Path::new("-"))
    }

    fn with_path(writer: W, path: &Path) -> Self {
        Self {
            writer: BufWriter::with_capacity(WRITE_BUFFER_SIZE, writer),
            path: path.to_path_buf(),
            count: 0,
        }
    }

    /// Number of readings written.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Write a single reading.
    pub fn write(&mut self, reading: &Reading) -> Result<()> {
        serde_json::to_writer(&mut self.writer, reading)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| Error::output(&self.path, e))?;

        self.count += 1;

        Ok(())
    }

    /// Write readings in order.
    pub fn write_all(&mut self, readings: &[Reading]) -> Result<()> {
        for reading in readings {
            self.write(reading)?;
        }

        Ok(())
    }

    /// Flush buffered readings to the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::output(&self.path, e))
    }

    /// Flush and return the underlying stream.
    pub fn finish(self) -> Result<W> {
        let path = self.path;

        self.writer
            .into_inner()
            .map_err(|e| Error::output(&path, e.into_error()))
    }
}

impl NdjsonSink<File> {
    /// Construct a sink writing to a new file.
    ///
    /// An existing file is truncated.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::create(path).map_err(|e| {
            log::error!("Error creating file: {}", e);
            Error::output(path, e)
        })?;

        Ok(Self::with_path(file, path))
    }

    /// Flush, sync to disk and close the file.
    pub fn close(self) -> Result<()> {
        let path = self.path.clone();

        self.finish()?
            .sync_all()
            .map_err(|e| Error::output(&path, e))
    }
}

/// Write readings to a stream.
pub fn write_readings<W: Write>(readings: &[Reading], writer: W) -> Result<W> {
    let mut sink = NdjsonSink::new(writer);
    sink.write_all(readings)?;
    sink.finish()
}

/// Save readings to a file.
///
/// The readings are written to a staging file next to `path` which is moved
/// into place once it has been written completely. On failure the staging file
/// is removed and `path` is left untouched.
pub fn save_to_file(readings: &[Reading], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    log::info!("Saving data to JSON file: {}", path.display());

    let staging = crate::util::staging_path(path);

    let result = NdjsonSink::create(&staging)
        .and_then(|mut sink| {
            sink.write_all(readings)?;
            sink.close()
        })
        .and_then(|_| std::fs::rename(&staging, path).map_err(|e| Error::output(path, e)));

    if let Err(e) = result {
        log::error!("Error writing JSON data: {}", e);
        std::fs::remove_file(&staging).ok();
        return Err(e);
    }

    log::info!("Data successfully saved to {}", path.display());

    Ok(())
}
