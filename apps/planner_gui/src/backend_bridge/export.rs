use std::{
    io,
    path::{Path, PathBuf},
};

use client_core::ItineraryService;
use shared::protocol::ExportRequest;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{info, warn};

use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};

const MAX_NAME_COLLISIONS: u32 = 99;

/// Fetches the exported document and saves it under `export_dir`.
pub async fn run_export(
    service: &dyn ItineraryService,
    request: &ExportRequest,
    export_dir: &Path,
) -> UiEvent {
    info!(destination = %request.trip.destination, "requesting document export");
    let document = match service.export_document(request).await {
        Ok(document) => document,
        Err(err) => {
            warn!(kind = ?err.kind(), "document export failed: {err}");
            return UiEvent::ExportFinished(Err(UiError::from_client_error(
                UiErrorContext::Export,
                &err,
                service.base_url(),
            )));
        }
    };

    let preferred = export_dir.join(request.trip.export_file_name(document.extension()));
    match save_document(export_dir, &preferred, &document.bytes).await {
        Ok(path) => {
            info!(path = %path.display(), bytes = document.bytes.len(), "document saved");
            UiEvent::ExportFinished(Ok(path))
        }
        Err(err) => {
            warn!(path = %preferred.display(), "failed to save exported document: {err}");
            UiEvent::ExportFinished(Err(UiError::new(
                UiErrorCategory::Io,
                UiErrorContext::Export,
                format!(
                    "Error exporting document: could not save '{}': {err}",
                    preferred.display()
                ),
            )))
        }
    }
}

/// Writes `bytes` to `preferred`, or to the first free numbered sibling
/// (`name (1).pdf`, `name (2).pdf`, ...) when earlier exports exist.
async fn save_document(export_dir: &Path, preferred: &Path, bytes: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(export_dir).await?;
    for attempt in 0..=MAX_NAME_COLLISIONS {
        let path = numbered_path(preferred, attempt);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        };
        file.write_all(bytes).await?;
        file.flush().await?;
        return Ok(path);
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{MAX_NAME_COLLISIONS} numbered copies already exist"),
    ))
}

fn numbered_path(preferred: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return preferred.to_path_buf();
    }
    let stem = preferred
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let name = match preferred.extension() {
        Some(ext) => format!("{stem} ({attempt}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({attempt})"),
    };
    preferred.with_file_name(name)
}
