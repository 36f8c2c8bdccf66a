//! Case data sources
//!
//! Where the raw CSV text comes from. The dashboard reads a fixed remote
//! URL; local files and in-memory text are used for offline runs and tests.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{DataSourceError, PipelineResult};

/// Published case dataset for April 2020
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/ZacTey/singaporecovid19/master/SingaporeCovid19April2020.csv";

/// Common trait for all case data sources
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// Human-readable description for logs and status output
    fn describe(&self) -> String;

    /// Fetch the full CSV body
    async fn fetch(&self) -> PipelineResult<String>;
}

/// Remote CSV over HTTP(S)
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create a source with no request timeout
    pub fn new(url: impl Into<String>) -> PipelineResult<Self> {
        Self::build(url.into(), None)
    }

    /// Create a source whose requests give up after `timeout`
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> PipelineResult<Self> {
        Self::build(url.into(), Some(timeout))
    }

    fn build(url: String, timeout: Option<Duration>) -> PipelineResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CaseSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> PipelineResult<String> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(response.text().await?)
    }
}

/// CSV file on the local filesystem
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CaseSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> PipelineResult<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// CSV text held in memory
pub struct InlineSource {
    body: String,
}

impl InlineSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl CaseSource for InlineSource {
    fn describe(&self) -> String {
        format!("inline ({} bytes)", self.body.len())
    }

    async fn fetch(&self) -> PipelineResult<String> {
        Ok(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cluster_local,latitude,longitude,gender,nationality").unwrap();
        writeln!(file, "A,1.0,1.0,f,singapore").unwrap();

        let source = FileSource::new(file.path());
        let body = source.fetch().await.unwrap();
        assert!(body.starts_with("cluster_local"));
        assert!(body.contains("A,1.0,1.0,f,singapore"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("absent.csv"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DataSourceError::Io(_)));
    }

    #[tokio::test]
    async fn test_inline_source() {
        let source = InlineSource::new("a,b\n1,2");
        assert_eq!(source.fetch().await.unwrap(), "a,b\n1,2");
        assert_eq!(source.describe(), "inline (7 bytes)");
    }

    #[test]
    fn test_http_source_keeps_url() {
        let source = HttpSource::new(DEFAULT_DATA_URL).unwrap();
        assert_eq!(source.url(), DEFAULT_DATA_URL);
        assert_eq!(source.describe(), DEFAULT_DATA_URL);
    }
}
