use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::api::{ApiError, Credentials, HistoryApi};
use crate::core::RefreshTicket;

use super::events::{AppEvent, Notification, NotificationLevel};
use super::widgets::image_preview::ImagePreview;

/// Effect layer: runs API calls on spawned tasks and delivers each result
/// back to the event loop as an [`AppEvent`].
///
/// Views never await; they call a method here and handle the matching event
/// when it arrives.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn HistoryApi>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    pub download_dir: PathBuf,
}

impl Services {
    pub fn new(
        api: Arc<dyn HistoryApi>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            event_tx,
            download_dir,
        }
    }

    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    pub fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let _ = self
            .event_tx
            .send(AppEvent::Notification(Notification::new(message, level)));
    }

    pub fn check_auth(&self) {
        let api = self.api.clone();
        self.spawn(async move { AppEvent::AuthChecked(api.check_auth().await) });
    }

    pub fn login(&self, credentials: Credentials) {
        let api = self.api.clone();
        self.spawn(async move {
            let result = match api.login(credentials).await {
                Ok(()) => api.check_auth().await,
                Err(e) => Err(e),
            };
            AppEvent::LoginFinished(result)
        });
    }

    pub fn logout(&self) {
        let api = self.api.clone();
        self.spawn(async move {
            if let Err(e) = api.logout().await {
                log::warn!("Logout request failed: {e}");
            }
            AppEvent::LoggedOut
        });
    }

    pub fn load_history(&self, ticket: RefreshTicket) {
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.list_history(ticket.query).await;
            AppEvent::HistoryLoaded {
                seq: ticket.seq,
                result,
            }
        });
    }

    pub fn check_stats(&self) {
        let api = self.api.clone();
        self.spawn(async move { AppEvent::StatsLoaded(api.stats().await) });
    }

    pub fn toggle_favorite(&self, id: i64) {
        let api = self.api.clone();
        self.spawn(async move {
            AppEvent::FavoriteToggled {
                id,
                result: api.toggle_favorite(id).await,
            }
        });
    }

    pub fn delete_record(&self, id: i64) {
        let api = self.api.clone();
        self.spawn(async move {
            AppEvent::RecordDeleted {
                id,
                result: api.delete_record(id).await,
            }
        });
    }

    pub fn batch_delete(&self, ids: Vec<i64>) {
        let api = self.api.clone();
        self.spawn(async move { AppEvent::BatchDeleted(api.batch_delete(ids).await) });
    }

    /// Fetch an image record and decode it on the blocking pool.
    pub fn load_image(&self, id: i64) {
        let api = self.api.clone();
        self.spawn(async move {
            let result = async {
                let bytes = api.fetch_file(id).await?.bytes;
                tracing::debug!(id, len = bytes.len(), "decoding image");
                tokio::task::spawn_blocking(move || ImagePreview::decode(&bytes))
                    .await
                    .map_err(io::Error::other)?
                    .map_err(ApiError::from)
            }
            .await;
            AppEvent::ImageLoaded { id, result }
        });
    }

    /// Fetch `/api/file/{id}` and save it into the download directory.
    pub fn download(&self, id: i64, suggested_name: Option<String>) {
        let api = self.api.clone();
        let dir = self.download_dir.clone();
        self.spawn(async move {
            let result = async {
                let blob = api.fetch_file(id).await?;
                let name = download_name(id, blob.filename.as_deref(), suggested_name.as_deref());
                save_new_file(&dir, &name, &blob.bytes)
                    .await
                    .map_err(ApiError::from)
            }
            .await;
            AppEvent::Downloaded { id, result }
        });
    }
}

/// Pick a file name: server header, then record content, then `clip-<id>.bin`.
pub fn download_name(id: i64, header_name: Option<&str>, suggested: Option<&str>) -> String {
    [header_name, suggested]
        .into_iter()
        .flatten()
        .map(sanitize_filename)
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| format!("clip-{id}.bin"))
}

/// Replace path separators and control characters; strip leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim().trim_start_matches('.').trim().to_string()
}

/// `name`, or `stem (n).ext` for the first `n` that does not exist yet.
fn candidate(dir: &Path, name: &str, n: u32) -> PathBuf {
    if n == 0 {
        return dir.join(name);
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
        None => dir.join(format!("{stem} ({n})")),
    }
}

/// Write `bytes` to a new file in `dir`. Existing files are never overwritten.
pub async fn save_new_file(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    for n in 0..1000 {
        let path = candidate(dir, name, n);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                log::info!("Saved download to {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free file name for {name}"),
    ))
}
