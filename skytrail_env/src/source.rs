//! Flight data sources.

use crate::error::EnvError;
use async_trait::async_trait;
use skytrail_core::{parse_samples, FlightSample};
use std::path::{Path, PathBuf};

/// Supplies the recorded flight, once, before playback starts.
///
/// # Implementations
///
/// - `FileSource` - a JSON recording on disk
/// - `MemorySource` - samples already in memory
#[async_trait]
pub trait FlightDataSource: Send + Sync + 'static {
    /// Loads the full sample sequence in playback order.
    ///
    /// No retries: a failure here means the data is unavailable.
    async fn load(&self) -> Result<Vec<FlightSample>, EnvError>;

    /// Human-readable name for logs and diagnostics.
    fn describe(&self) -> String;
}

/// JSON flight recording on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FlightDataSource for FileSource {
    async fn load(&self) -> Result<Vec<FlightSample>, EnvError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| EnvError::io(self.describe(), e))?;
        let samples = parse_samples(&bytes).map_err(|e| EnvError::parse(self.describe(), e))?;
        tracing::debug!("Read {} samples from {}", samples.len(), self.describe());
        Ok(samples)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Samples held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    samples: Vec<FlightSample>,
}

impl MemorySource {
    pub fn new(samples: Vec<FlightSample>) -> Self {
        Self { samples }
    }
}

#[async_trait]
impl FlightDataSource for MemorySource {
    async fn load(&self) -> Result<Vec<FlightSample>, EnvError> {
        Ok(self.samples.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} samples)", self.samples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_source_reads_recording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("balloon_flight.json");
        fs::write(
            &path,
            r#"[{"x": 0, "y": 0, "z": 0, "radiation": 0.1, "wind": 10.0},
                {"x": 7.1, "y": 7.1, "z": 8.0, "radiation": 0.12, "wind": 10.016}]"#,
        )
        .unwrap();

        let samples = FileSource::new(&path).load().await.unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].z, 8.0);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = FileSource::new(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, EnvError::Io { .. }));
    }

    #[tokio::test]
    async fn test_garbage_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not a recording").unwrap();

        let err = FileSource::new(&path).load().await.unwrap_err();
        assert!(matches!(err, EnvError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new(vec![FlightSample::new(1.0, 2.0, 3.0, 0.2)]);
        assert_eq!(source.load().await.unwrap().len(), 1);
        assert_eq!(source.describe(), "memory (1 samples)");
    }
}
