//! Failure classification.
//!
//! Every way an exchange with the backend can go wrong is first reduced to a
//! [`Failure`] (transport problem, non-2xx status, unreadable body), and then
//! [`Failure::into_error`] gives it its operation-specific meaning. This is
//! the only place that decides which [`ConverterError`] variant a caller sees.

use crate::error::{ConnectivityReason, ConverterError};
use crate::kind::ConversionKind;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::error::Error as StdError;
use std::io;
use tracing::warn;

/// The operation a failure belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operation<'a> {
    Health,
    Convert(ConversionKind),
    Download(&'a str),
}

/// A failed exchange, before it is given an operation-specific meaning.
#[derive(Debug)]
pub(crate) enum Failure {
    /// The request never produced a complete response.
    Transport(ConnectivityReason),
    /// The backend answered with a non-success status.
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    /// A success status with a body that does not parse.
    Malformed { status: StatusCode, detail: String },
    /// The request could not even be built.
    Other(String),
}

/// Classify a reqwest error raised while sending or reading.
pub(crate) fn transport(err: &reqwest::Error) -> Failure {
    if err.is_builder() {
        return Failure::Other(chain_text(err));
    }
    let reason = if err.is_timeout() {
        ConnectivityReason::TimedOut
    } else if io_error_kind(err) == Some(io::ErrorKind::ConnectionRefused) {
        ConnectivityReason::ConnectionRefused
    } else if looks_like_dns_failure(err) {
        ConnectivityReason::HostNotFound
    } else {
        ConnectivityReason::Other(chain_text(err))
    };
    Failure::Transport(reason)
}

/// Classify a non-success response, reading its `detail` if it has one.
pub(crate) async fn status(response: Response) -> Failure {
    let status = response.status();
    let detail = match response.bytes().await {
        Ok(body) => extract_detail(&body),
        Err(_) => None,
    };
    Failure::Status { status, detail }
}

/// Decode a success response as JSON.
pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> Result<T, Failure> {
    let status = response.status();
    let body = response.bytes().await.map_err(|e| transport(&e))?;
    serde_json::from_slice(&body).map_err(|e| Failure::Malformed {
        status,
        detail: e.to_string(),
    })
}

/// FastAPI-style error body. Only string details are surfaced; validation
/// errors with a list of issues fall through to the generic message.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn io_error_kind(err: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<io::Error>() {
            return Some(io.kind());
        }
        source = e.source();
    }
    None
}

fn looks_like_dns_failure(err: &reqwest::Error) -> bool {
    let text = chain_text(err).to_lowercase();
    [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
    ]
    .iter()
    .any(|needle| text.contains(needle))
}

/// The error and all its sources, joined with `": "`.
fn chain_text(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let msg = e.to_string();
        if !text.contains(&msg) {
            text.push_str(": ");
            text.push_str(&msg);
        }
        source = e.source();
    }
    text
}

const CONVERT_UNAVAILABLE: &str = "Cannot connect to conversion service. Please try again later.";
const DOWNLOAD_UNAVAILABLE: &str = "Cannot connect to download service. Please try again later.";

impl Failure {
    /// Map this failure onto the public taxonomy for `op`.
    ///
    /// Connectivity reasons are classified identically for all operations
    /// (5xx without a structured detail counts as connectivity everywhere);
    /// only the message differs.
    pub(crate) fn into_error(self, op: Operation<'_>, base_url: &str) -> ConverterError {
        match op {
            Operation::Health => self.into_health_error(base_url),
            Operation::Convert(kind) => self.into_convert_error(kind),
            Operation::Download(filename) => self.into_download_error(filename),
        }
    }

    fn into_health_error(self, base_url: &str) -> ConverterError {
        match self {
            Failure::Transport(reason) => {
                let message = match &reason {
                    ConnectivityReason::HostNotFound => {
                        format!("API server not found at {base_url}. Please check the server URL.")
                    }
                    ConnectivityReason::TimedOut => {
                        format!("API server at {base_url} did not respond in time.")
                    }
                    _ => format!(
                        "Cannot connect to API server at {base_url}. Please ensure the backend server is running."
                    ),
                };
                ConverterError::Connectivity { message, reason }
            }
            Failure::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                ConverterError::Protocol {
                    message: "Health check endpoint not found. Please verify the API implementation."
                        .to_string(),
                    status: status.as_u16(),
                }
            }
            Failure::Status { status, .. } if status.is_server_error() => {
                ConverterError::Connectivity {
                    message: format!(
                        "Server error ({}) from API server at {base_url}",
                        status_line(status)
                    ),
                    reason: ConnectivityReason::ServerError {
                        status: status.as_u16(),
                    },
                }
            }
            Failure::Status { status, .. } => ConverterError::Protocol {
                message: format!(
                    "Unexpected response from {base_url}/health: {}",
                    status_line(status)
                ),
                status: status.as_u16(),
            },
            Failure::Malformed { status, detail } => ConverterError::Protocol {
                message: format!("API health check returned an unreadable payload: {detail}"),
                status: status.as_u16(),
            },
            Failure::Other(msg) => ConverterError::unknown(format!("API health check failed: {msg}")),
        }
    }

    fn into_convert_error(self, kind: ConversionKind) -> ConverterError {
        match self {
            Failure::Status {
                status,
                detail: Some(detail),
            } => ConverterError::RemoteRejection {
                detail,
                status: status.as_u16(),
            },
            Failure::Transport(reason) => ConverterError::Connectivity {
                message: CONVERT_UNAVAILABLE.to_string(),
                reason,
            },
            Failure::Status { status, .. } if status.is_server_error() => {
                ConverterError::Connectivity {
                    message: CONVERT_UNAVAILABLE.to_string(),
                    reason: ConnectivityReason::ServerError {
                        status: status.as_u16(),
                    },
                }
            }
            Failure::Malformed { status, detail } => {
                warn!(%status, "Unreadable {} response: {}", kind.label(), detail);
                ConverterError::unknown(kind.failure_message())
            }
            Failure::Status { .. } | Failure::Other(_) => {
                ConverterError::unknown(kind.failure_message())
            }
        }
    }

    fn into_download_error(self, filename: &str) -> ConverterError {
        match self {
            Failure::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                ConverterError::NotFound {
                    message: "File not found or has expired".to_string(),
                    filename: filename.to_string(),
                }
            }
            Failure::Transport(reason) => ConverterError::Connectivity {
                message: DOWNLOAD_UNAVAILABLE.to_string(),
                reason,
            },
            Failure::Status { status, .. } if status.is_server_error() => {
                ConverterError::Connectivity {
                    message: DOWNLOAD_UNAVAILABLE.to_string(),
                    reason: ConnectivityReason::ServerError {
                        status: status.as_u16(),
                    },
                }
            }
            _ => ConverterError::unknown("File download failed"),
        }
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://127.0.0.1:5000";

    fn status_failure(code: u16, detail: Option<&str>) -> Failure {
        Failure::Status {
            status: StatusCode::from_u16(code).unwrap(),
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(
            extract_detail(br#"{"detail":"Only PDF files are allowed"}"#).as_deref(),
            Some("Only PDF files are allowed")
        );
        assert_eq!(extract_detail(br#"{"detail":[{"loc":["body"]}]}"#), None);
        assert_eq!(extract_detail(br#"{"detail":"  "}"#), None);
        assert_eq!(extract_detail(b"<html>oops</html>"), None);
    }

    #[test]
    fn refused_health_names_base_url() {
        let err = Failure::Transport(ConnectivityReason::ConnectionRefused)
            .into_error(Operation::Health, BASE);
        assert!(matches!(err, ConverterError::Connectivity { .. }));
        assert!(err.to_string().contains(BASE), "{err}");
    }

    #[test]
    fn health_reasons_get_distinct_messages() {
        let refused = Failure::Transport(ConnectivityReason::ConnectionRefused)
            .into_error(Operation::Health, BASE)
            .to_string();
        let dns = Failure::Transport(ConnectivityReason::HostNotFound)
            .into_error(Operation::Health, BASE)
            .to_string();
        let server = status_failure(503, None).into_error(Operation::Health, BASE);
        assert_ne!(refused, dns);
        assert!(dns.contains("not found"));
        assert_eq!(
            server.connectivity_reason(),
            Some(&ConnectivityReason::ServerError { status: 503 })
        );
        assert!(server.to_string().contains("503 Service Unavailable"));
    }

    #[test]
    fn health_404_is_protocol() {
        let err = status_failure(404, Some("Not Found")).into_error(Operation::Health, BASE);
        assert!(matches!(err, ConverterError::Protocol { status: 404, .. }));
    }

    #[test]
    fn malformed_health_is_protocol() {
        let err = Failure::Malformed {
            status: StatusCode::OK,
            detail: "missing field `version`".into(),
        }
        .into_error(Operation::Health, BASE);
        assert!(matches!(err, ConverterError::Protocol { status: 200, .. }));
    }

    #[test]
    fn conversion_detail_wins() {
        let op = Operation::Convert(ConversionKind::PdfToWord);
        let err = status_failure(500, Some("Conversion error: broken xref")).into_error(op, BASE);
        match err {
            ConverterError::RemoteRejection { detail, status } => {
                assert_eq!(detail, "Conversion error: broken xref");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn conversion_connectivity_uses_fixed_message() {
        let op = Operation::Convert(ConversionKind::MergePdf);
        for failure in [
            Failure::Transport(ConnectivityReason::ConnectionRefused),
            Failure::Transport(ConnectivityReason::TimedOut),
            status_failure(502, None),
        ] {
            let err = failure.into_error(op, BASE);
            assert!(matches!(err, ConverterError::Connectivity { .. }));
            assert_eq!(err.to_string(), CONVERT_UNAVAILABLE);
        }
    }

    #[test]
    fn conversion_fallback_is_per_operation() {
        let err = status_failure(422, None)
            .into_error(Operation::Convert(ConversionKind::WordToPdf), BASE);
        assert!(matches!(err, ConverterError::UnknownFailure { .. }));
        assert_eq!(err.to_string(), "Word to PDF conversion failed");
    }

    #[test]
    fn unreadable_conversion_reply_is_unknown_failure() {
        let err = Failure::Malformed {
            status: StatusCode::OK,
            detail: "missing field `message`".into(),
        }
        .into_error(Operation::Convert(ConversionKind::PdfToImages), BASE);
        assert!(matches!(err, ConverterError::UnknownFailure { .. }), "got {err:?}");
        assert_eq!(err.to_string(), "PDF to Images conversion failed");
    }

    #[test]
    fn download_mapping() {
        let op = Operation::Download("missing.pdf");
        match status_failure(404, Some("File not found")).into_error(op, BASE) {
            ConverterError::NotFound { message, filename } => {
                assert_eq!(message, "File not found or has expired");
                assert_eq!(filename, "missing.pdf");
            }
            other => panic!("unexpected {other:?}"),
        }
        let err = Failure::Transport(ConnectivityReason::ConnectionRefused).into_error(op, BASE);
        assert_eq!(err.to_string(), DOWNLOAD_UNAVAILABLE);
        let err = status_failure(400, Some("Invalid filename")).into_error(op, BASE);
        assert_eq!(err.to_string(), "File download failed");
    }
}
