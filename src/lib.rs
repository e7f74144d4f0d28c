//! # docconv-client
//!
//! Typed async client for a document-conversion backend: PDF → Word,
//! Word → PDF, PDF merge and PDF → images.
//!
//! The conversions themselves run on the server. This crate turns typed
//! requests into HTTP calls, reports upload progress, and folds every failure
//! into one error taxonomy ([`ConverterError`]).
//!
//! ## Request Flow
//!
//! ```text
//! FileUpload(s)
//!  │
//!  ├─ 1. Validate  file count / extension / 50MB ceiling (no network)
//!  ├─ 2. Upload    multipart POST, progress callback per chunk
//!  ├─ 3. Classify  transport error or non-2xx → ConverterError
//!  └─ 4. Result    ConversionResult { message, filename, image_count }
//!                   └─ download_file(filename) within the retention window
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docconv_client::{ConversionClient, ConversionKind, FileUpload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base URL from CONVERTER_API_URL, else http://127.0.0.1:5000
//!     let client = ConversionClient::from_env()?;
//!     if !client.is_api_reachable().await {
//!         eprintln!("backend down: {:?}", client.api_status().await.error);
//!         return Ok(());
//!     }
//!     let files = vec![
//!         FileUpload::from_path("part1.pdf").await?,
//!         FileUpload::from_path("part2.pdf").await?,
//!     ];
//!     let merged = client.convert(ConversionKind::MergePdf, &files, None).await?;
//!     client.download_to_file(&merged.filename, "merged.pdf").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docconv-client = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod kind;
pub mod output;
pub mod progress;
mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::ConversionClient;
pub use config::{ClientConfig, ClientConfigBuilder, API_URL_ENV, DEFAULT_API_URL};
pub use error::{ConnectivityReason, ConverterError, Result};
pub use files::{format_file_size, validate_file, FileUpload, MAX_FILE_SIZE};
pub use kind::{accepted_file_types, ConversionKind, KindRule};
pub use output::{ApiStatus, ConversionResult, HealthStatus};
pub use progress::{ProgressCallback, UploadProgress, UploadProgressCallback};
