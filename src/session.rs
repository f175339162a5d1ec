//! Generation session: preview lifecycle and downloads
//!
//! Mirrors the interactive flow around the render exchange: compose, block
//! empty payloads before any request, hold the latest preview, and save it
//! under the `qrcode-<type>-<unixMillis>.png` naming convention. Parameter
//! changes re-render through an explicit [`GeneratorSession::regenerate`]
//! call, and each render is awaited in full, so a session never has
//! overlapping in-flight requests racing to update the preview.

use crate::client::RenderClient;
use crate::error::{Error, Result};
use crate::payload::{ContentKind, QrContent};
use crate::render::{QrRenderer, RenderOptions};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// How long the success indicator stays raised after a render
const SUCCESS_FLASH: Duration = Duration::from_secs(2);

/// Where rendering happens: in-process or through a running service
pub enum RenderBackend {
    /// Render in-process with the library encoder
    Local(QrRenderer),
    /// Render through the HTTP service
    Remote(RenderClient),
}

impl RenderBackend {
    async fn render(&self, data: &str, options: RenderOptions) -> Result<Bytes> {
        match self {
            RenderBackend::Local(renderer) => Ok(renderer.render_png(data, options)?.png),
            RenderBackend::Remote(client) => client.render(data, options).await,
        }
    }
}

/// Session request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No render in flight
    Idle,
    /// A render request has been issued and is being awaited
    Generating,
}

/// The current preview image and what it encodes
#[derive(Debug, Clone)]
pub struct Preview {
    /// PNG bytes of the latest successful render
    pub png: Bytes,
    /// Content type the preview was generated from
    pub kind: ContentKind,
}

/// Stateful controller over the generate/preview/download flow
pub struct GeneratorSession {
    backend: RenderBackend,
    state: SessionState,
    preview: Option<Preview>,
    last_payload: Option<(ContentKind, String)>,
    flash_until: Option<Instant>,
}

impl GeneratorSession {
    /// Create a session over the given render backend
    pub fn new(backend: RenderBackend) -> Self {
        Self {
            backend,
            state: SessionState::Idle,
            preview: None,
            last_payload: None,
            flash_until: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The latest successful preview, if any
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Whether the transient "generated" indicator is still raised
    pub fn success_flash_active(&self) -> bool {
        self.flash_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// Compose the content and render it, replacing the preview on success.
    ///
    /// An empty composition fails with [`Error::EmptyPayload`] before any
    /// request is issued; the session does not enter the generating state.
    /// On a failed render the previous preview is left untouched.
    pub async fn generate(&mut self, content: &QrContent, options: RenderOptions) -> Result<()> {
        let data = content.compose();
        if data.is_empty() {
            return Err(Error::EmptyPayload);
        }

        self.render_payload(content.kind(), data, options).await
    }

    /// Re-render the last composed payload with new options.
    ///
    /// Replaces the original UI's implicit regeneration on size/color
    /// changes with an explicit operation.
    pub async fn regenerate(&mut self, options: RenderOptions) -> Result<()> {
        let (kind, data) = self
            .last_payload
            .clone()
            .ok_or_else(|| Error::Other("nothing to regenerate yet".to_string()))?;
        self.render_payload(kind, data, options).await
    }

    async fn render_payload(
        &mut self,
        kind: ContentKind,
        data: String,
        options: RenderOptions,
    ) -> Result<()> {
        self.state = SessionState::Generating;
        let outcome = self.backend.render(&data, options).await;
        self.state = SessionState::Idle;

        match outcome {
            Ok(png) => {
                // Replacing the preview drops the previous buffer.
                self.preview = Some(Preview { png, kind });
                self.last_payload = Some((kind, data));
                self.flash_until = Some(Instant::now() + SUCCESS_FLASH);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Save the current preview under `dir`, returning the written path.
    ///
    /// A no-op returning `Ok(None)` when no preview exists.
    pub fn save_preview(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let preview = match self.preview.as_ref() {
            Some(preview) => preview,
            None => return Ok(None),
        };

        let path = dir.join(download_filename(preview.kind));
        std::fs::write(&path, &preview.png).map_err(Error::Io)?;
        Ok(Some(path))
    }
}

/// Download filename convention: `qrcode-<type>-<unixMillis>.png`
pub fn download_filename(kind: ContentKind) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    format!("qrcode-{}-{}.png", kind, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Security, WifiNetwork};

    fn local_session() -> GeneratorSession {
        GeneratorSession::new(RenderBackend::Local(QrRenderer::new()))
    }

    #[tokio::test]
    async fn test_empty_payload_blocks_without_state_change() {
        let mut session = local_session();
        let content = QrContent::Wifi(WifiNetwork::default());

        let result = session.generate(&content, RenderOptions::default()).await;
        assert!(matches!(result, Err(Error::EmptyPayload)));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.preview().is_none());
    }

    #[tokio::test]
    async fn test_generate_sets_preview_and_flash() {
        let mut session = local_session();
        let content = QrContent::Url("https://example.com".to_string());

        session
            .generate(&content, RenderOptions::default())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Idle);
        let preview = session.preview().expect("preview set");
        assert_eq!(preview.kind, ContentKind::Url);
        assert!(!preview.png.is_empty());
        assert!(session.success_flash_active());
    }

    #[tokio::test]
    async fn test_failed_render_keeps_previous_preview() {
        let mut session = local_session();
        session
            .generate(
                &QrContent::Text("keep me".to_string()),
                RenderOptions::default(),
            )
            .await
            .unwrap();
        let before = session.preview().unwrap().png.clone();

        // Exceeds QR capacity at the highest error-correction tier.
        let oversized = QrContent::Text("x".repeat(8_000));
        let result = session.generate(&oversized, RenderOptions::default()).await;
        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.preview().unwrap().png, before);
    }

    #[tokio::test]
    async fn test_regenerate_reuses_last_payload() {
        let mut session = local_session();
        session
            .generate(
                &QrContent::Wifi(WifiNetwork {
                    ssid: "Home".to_string(),
                    password: "pw".to_string(),
                    security: Security::Wpa,
                }),
                RenderOptions { size: 300 },
            )
            .await
            .unwrap();
        let small = session.preview().unwrap().png.clone();

        session.regenerate(RenderOptions { size: 500 }).await.unwrap();
        let large = session.preview().unwrap().png.clone();

        assert_eq!(session.preview().unwrap().kind, ContentKind::Wifi);
        assert_ne!(small, large);
    }

    #[tokio::test]
    async fn test_regenerate_without_history_fails() {
        let mut session = local_session();
        assert!(session.regenerate(RenderOptions::default()).await.is_err());
    }

    #[test]
    fn test_save_preview_without_preview_is_noop() {
        let session = local_session();
        let saved = session.save_preview(Path::new(".")).unwrap();
        assert!(saved.is_none());
    }

    #[tokio::test]
    async fn test_save_preview_uses_download_convention() {
        let mut session = local_session();
        session
            .generate(
                &QrContent::Text("download me".to_string()),
                RenderOptions::default(),
            )
            .await
            .unwrap();

        let dir = std::env::temp_dir();
        let path = session.save_preview(&dir).unwrap().expect("path written");
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("qrcode-text-"));
        assert!(name.ends_with(".png"));
        assert!(!std::fs::read(&path).unwrap().is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
