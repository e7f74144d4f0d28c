//! Multipart request bodies.
//!
//! Without a progress callback each part is a plain in-memory body. With
//! one, each part's content is re-sliced into `chunk_size` pieces (cheap
//! [`Bytes`] views, no copying) and streamed; the [`UploadTracker`] is told
//! about every chunk as the transport pulls it.

use crate::error::{ConverterError, Result};
use crate::files::FileUpload;
use crate::progress::{ProgressCallback, UploadTracker};
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::sync::Arc;

/// Build a multipart form with every file under `field`.
pub(crate) fn build_form(
    files: &[FileUpload],
    field: &'static str,
    chunk_size: usize,
    progress: Option<ProgressCallback>,
) -> Result<Form> {
    let total: u64 = files.iter().map(FileUpload::size).sum();
    let tracker = progress.map(|cb| UploadTracker::new(total, cb));

    let mut form = Form::new();
    for file in files {
        let body = match &tracker {
            Some(t) => Body::wrap_stream(chunked(file.content().clone(), chunk_size, t.clone())),
            None => Body::from(file.content().clone()),
        };
        let part = Part::stream_with_length(body, file.size())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type().as_ref())
            .map_err(|e| {
                ConverterError::unknown(format!("Invalid MIME type for '{}': {e}", file.name()))
            })?;
        form = form.part(field, part);
    }
    Ok(form)
}

fn chunked(
    content: Bytes,
    chunk_size: usize,
    tracker: Arc<UploadTracker>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
    stream::iter(split(&content, chunk_size)).map(move |chunk| {
        tracker.advance(chunk.len());
        Ok(chunk)
    })
}

fn split(content: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let step = chunk_size.max(1);
    (0..content.len())
        .step_by(step)
        .map(|start| content.slice(start..(start + step).min(content.len())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::UploadProgress;
    use std::sync::Mutex;

    #[test]
    fn split_covers_everything() {
        let content = Bytes::from_static(b"abcdefghij");
        let chunks = split(&content, 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
        assert!(split(&Bytes::new(), 4).is_empty());
    }

    #[tokio::test]
    async fn chunked_stream_reports_each_chunk() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let tracker = UploadTracker::new(
            8,
            Arc::new(move |p: UploadProgress| sink.lock().unwrap().push(p.percentage)),
        );

        let chunks: Vec<_> = chunked(Bytes::from_static(b"12345678"), 4, tracker)
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![50, 100]);
    }

    #[test]
    fn form_builds_for_every_file() {
        let files = vec![
            FileUpload::new("a.pdf", b"%PDF-a".to_vec()),
            FileUpload::new("b.pdf", b"%PDF-b".to_vec()),
        ];
        assert!(build_form(&files, "files", 1024, None).is_ok());
    }
}
