//! The conversion client.
//!
//! [`ConversionClient`] holds no per-call state: every method builds its own
//! request from the injected [`ClientConfig`], so one client can be cloned
//! and shared across tasks and any number of calls may run concurrently.
//! Nothing is retried; a failed or timed-out call must be re-issued by the
//! caller.

use crate::config::ClientConfig;
use crate::error::{ConverterError, Result};
use crate::files::{validate_file, FileUpload};
use crate::kind::{accepted_file_types, ConversionKind};
use crate::output::{ApiStatus, ConversionResult, HealthStatus};
use crate::progress::ProgressCallback;
use crate::transport::classify::{self, Failure, Operation};
use crate::transport::upload;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, Url};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Typed façade over the conversion backend.
///
/// # Example
/// ```rust,no_run
/// use docconv_client::{ConversionClient, ConversionKind, FileUpload};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ConversionClient::from_env()?;
/// let file = FileUpload::from_path("report.pdf").await?;
/// let result = client.convert(ConversionKind::PdfToWord, &[file], None).await?;
/// let docx = client.download_file(&result.filename).await?;
/// std::fs::write("report.docx", &docx)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConversionClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ConversionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT);
        // a proxy can't reach our loopback
        if is_loopback(&config.base_url) {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ConverterError::InvalidConfig(format!("HTTP client: {e}")))?;

        debug!("Conversion client targeting {}", config.base_url);
        Ok(Self { config, http })
    }

    /// Client for the backend named by `CONVERTER_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // ── Health ───────────────────────────────────────────────────────────

    /// `GET /health`.
    ///
    /// # Errors
    /// - [`ConverterError::Connectivity`]: refused, unknown host, timeout
    ///   or 5xx; the message names the base URL
    /// - [`ConverterError::Protocol`]: 404 or an unreadable payload
    pub async fn check_health(&self) -> Result<HealthStatus> {
        let op = Operation::Health;
        let url = self.url("/health");
        debug!("Making GET request to: {}", url);

        let request = self
            .http
            .get(&url)
            .timeout(secs(self.config.health_timeout_secs));
        let response = self.send(op, request).await?;
        let health: HealthStatus = classify::json(response)
            .await
            .map_err(|f| self.fail(op, f))?;

        debug!("Health check successful: {} (v{})", health.status, health.version);
        Ok(health)
    }

    /// `true` when [`check_health`](Self::check_health) succeeds. Never fails.
    pub async fn is_api_reachable(&self) -> bool {
        self.check_health().await.is_ok()
    }

    /// Health check as a status record instead of an error. Never fails.
    pub async fn api_status(&self) -> ApiStatus {
        match self.check_health().await {
            Ok(health) => ApiStatus {
                reachable: true,
                url: self.config.base_url.clone(),
                error: None,
                health: Some(health),
            },
            Err(e) => ApiStatus {
                reachable: false,
                url: self.config.base_url.clone(),
                error: Some(e.to_string()),
                health: None,
            },
        }
    }

    // ── Conversions ──────────────────────────────────────────────────────

    pub async fn convert_pdf_to_word(
        &self,
        file: &FileUpload,
        on_progress: Option<ProgressCallback>,
    ) -> Result<ConversionResult> {
        self.upload(ConversionKind::PdfToWord, std::slice::from_ref(file), on_progress)
            .await
    }

    pub async fn convert_word_to_pdf(
        &self,
        file: &FileUpload,
        on_progress: Option<ProgressCallback>,
    ) -> Result<ConversionResult> {
        self.upload(ConversionKind::WordToPdf, std::slice::from_ref(file), on_progress)
            .await
    }

    /// Render every page to an image; the result's `image_count` is set and
    /// its download is a ZIP archive.
    pub async fn convert_pdf_to_images(
        &self,
        file: &FileUpload,
        on_progress: Option<ProgressCallback>,
    ) -> Result<ConversionResult> {
        self.upload(ConversionKind::PdfToImages, std::slice::from_ref(file), on_progress)
            .await
    }

    /// Merge `files` in order. Needs at least two.
    pub async fn merge_pdfs(
        &self,
        files: &[FileUpload],
        on_progress: Option<ProgressCallback>,
    ) -> Result<ConversionResult> {
        ConversionKind::MergePdf.check_file_count(files.len())?;
        self.upload(ConversionKind::MergePdf, files, on_progress).await
    }

    /// Validate `files` against `kind`'s rules, then run the conversion.
    ///
    /// File count, extensions and the 50MB ceiling are all checked locally;
    /// a violation returns [`ConverterError::Validation`] without any
    /// network traffic.
    pub async fn convert(
        &self,
        kind: ConversionKind,
        files: &[FileUpload],
        on_progress: Option<ProgressCallback>,
    ) -> Result<ConversionResult> {
        kind.check_file_count(files.len())?;
        let allowed = accepted_file_types(kind);
        for file in files {
            if let Some(msg) = validate_file(file, allowed) {
                return Err(ConverterError::validation(format!("{}: {msg}", file.name())));
            }
        }

        match kind {
            ConversionKind::PdfToWord => self.convert_pdf_to_word(&files[0], on_progress).await,
            ConversionKind::WordToPdf => self.convert_word_to_pdf(&files[0], on_progress).await,
            ConversionKind::PdfToImages => {
                self.convert_pdf_to_images(&files[0], on_progress).await
            }
            ConversionKind::MergePdf => self.merge_pdfs(files, on_progress).await,
        }
    }

    async fn upload(
        &self,
        kind: ConversionKind,
        files: &[FileUpload],
        on_progress: Option<ProgressCallback>,
    ) -> Result<ConversionResult> {
        let op = Operation::Convert(kind);
        let url = self.url(&kind.endpoint());
        let form = upload::build_form(
            files,
            kind.rule().field,
            self.config.upload_chunk_size,
            on_progress,
        )?;
        debug!("Making POST request to: {} ({} file(s))", url, files.len());

        let request = self
            .http
            .post(&url)
            .timeout(secs(self.config.conversion_timeout_secs))
            .multipart(form);
        let response = self.send(op, request).await?;
        let result: ConversionResult = classify::json(response)
            .await
            .map_err(|f| self.fail(op, f))?;

        info!("{} complete: {}", kind.label(), result.filename);
        Ok(result)
    }

    // ── Downloads ────────────────────────────────────────────────────────

    /// Absolute URL for a download locator. No I/O, no validation.
    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/download/{}", self.config.base_url, filename)
    }

    /// `GET /download/{filename}`.
    ///
    /// # Errors
    /// - [`ConverterError::NotFound`]: missing, or past the backend's
    ///   retention window
    /// - [`ConverterError::Connectivity`]: backend unreachable or 5xx
    pub async fn download_file(&self, filename: &str) -> Result<Bytes> {
        let op = Operation::Download(filename);
        let url = self.download_url(filename);
        debug!("Making GET request to: {}", url);

        let request = self
            .http
            .get(&url)
            .timeout(secs(self.config.download_timeout_secs));
        let response = self.send(op, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.fail(op, classify::transport(&e)))?;

        info!("Downloaded {} ({} bytes)", filename, bytes.len());
        Ok(bytes)
    }

    /// Download `filename` and write it to `path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    /// Returns the number of bytes written.
    pub async fn download_to_file(&self, filename: &str, path: impl AsRef<Path>) -> Result<u64> {
        let bytes = self.download_file(filename).await?;
        let path = path.as_ref();
        let write_err = |e: std::io::Error| ConverterError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".part");
        let tmp_path = std::path::PathBuf::from(tmp_name);
        tokio::fs::write(&tmp_path, &bytes).await.map_err(write_err)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

        Ok(bytes.len() as u64)
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(&self, op: Operation<'_>, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| self.fail(op, classify::transport(&e)))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.fail(op, classify::status(response).await))
        }
    }

    fn fail(&self, op: Operation<'_>, failure: Failure) -> ConverterError {
        let err = failure.into_error(op, &self.config.base_url);
        warn!("{:?} failed: {}", op, err);
        err
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn is_loopback(base_url: &str) -> bool {
    match Url::parse(base_url) {
        Ok(url) => match url.host_str() {
            Some("localhost") => true,
            Some(host) => host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .is_ok_and(|ip| ip.is_loopback()),
            None => false,
        },
        Err(_) => false,
    }
}
