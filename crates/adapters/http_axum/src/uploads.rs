//! Local filesystem implementation of [`ImageStore`].
//!
//! Files land in `<root>/<folder>/<uuid>.<ext>` and are served back by the
//! router under `/uploads`.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use labhub_app::ports::ImageStore;
use labhub_domain::error::{LabHubError, ValidationError};

/// Errors raised while writing or removing an uploaded file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload I/O failed at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<UploadError> for LabHubError {
    fn from(err: UploadError) -> Self {
        LabHubError::Storage(Box::new(err))
    }
}

/// Stores images below a root directory.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a `/uploads/...` path back below the root. `None` for anything
    /// outside `/uploads` or containing non-plain components.
    fn local_path(&self, public_path: &str) -> Option<PathBuf> {
        let relative = Path::new(public_path.strip_prefix("/uploads/")?);
        relative
            .components()
            .all(|part| matches!(part, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

impl ImageStore for LocalImageStore {
    fn store(
        &self,
        folder: &str,
        extension: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, LabHubError>> + Send {
        let dir = self.root.join(folder);
        let name = format!("{}.{extension}", uuid::Uuid::new_v4());
        let public_path = format!("/uploads/{folder}/{name}");
        async move {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| UploadError::Io {
                    path: dir.clone(),
                    source,
                })?;
            let path = dir.join(&name);
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|source| UploadError::Io {
                    path: path.clone(),
                    source,
                })?;
            tracing::info!(path = %public_path, "image stored");
            Ok(public_path)
        }
    }

    fn discard(&self, public_path: &str) -> impl Future<Output = Result<(), LabHubError>> + Send {
        let path = self.local_path(public_path);
        async move {
            let Some(path) = path else {
                return Ok(());
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "image discarded");
                    Ok(())
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(UploadError::Io { path, source }.into()),
            }
        }
    }
}

/// File extension for an accepted image `Content-Type`.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedImage`] for anything other than
/// PNG, JPEG, GIF or WebP.
pub fn image_extension(content_type: &str) -> Result<&'static str, ValidationError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        _ => Err(ValidationError::UnsupportedImage(content_type.to_string())),
    }
}
