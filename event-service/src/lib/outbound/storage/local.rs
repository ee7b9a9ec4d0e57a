//! Local filesystem storage for event images.

use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::domain::event::errors::ImageError;
use crate::domain::event::models::ImageRef;
use crate::domain::event::models::ImageUpload;
use crate::domain::event::ports::ImageStore;

const MAX_EXTENSION_LEN: usize = 8;

/// Image store writing into a single directory that is also served under `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    allowed_types: Vec<String>,
    max_file_size: usize,
}

impl LocalImageStore {
    /// Create the store, creating the root directory if needed.
    pub async fn new(
        root: impl Into<PathBuf>,
        allowed_types: Vec<String>,
        max_file_size: usize,
    ) -> Result<Self, ImageError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            ImageError::Io(format!(
                "Failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root,
            allowed_types: allowed_types
                .into_iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            max_file_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check(&self, upload: &ImageUpload) -> Result<(), ImageError> {
        let content_type = upload.content_type.trim().to_ascii_lowercase();
        if !self.allowed_types.contains(&content_type) {
            return Err(ImageError::UnsupportedType(upload.content_type.clone()));
        }

        if upload.data.len() > self.max_file_size {
            return Err(ImageError::TooLarge {
                size: upload.data.len(),
                max: self.max_file_size,
            });
        }

        Ok(())
    }
}

/// `<unix-millis>-<random>[.ext]`, keeping only a short alphanumeric extension.
fn stored_file_name(original: Option<&str>) -> String {
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<ImageRef, ImageError> {
        self.check(&upload)?;

        let file_name = stored_file_name(upload.file_name.as_deref());
        let path = self.root.join(&file_name);

        fs::write(&path, &upload.data)
            .await
            .map_err(|e| ImageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(file = %file_name, bytes = upload.data.len(), "Stored event image");

        Ok(ImageRef::new(file_name))
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageError> {
        let path = self.root.join(image.as_str());

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageError::Io(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
