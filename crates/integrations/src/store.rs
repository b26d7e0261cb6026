use hh_core::Error;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Content types accepted for listing photos, with their file extensions.
#[rustfmt::skip]
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg" ),
    ("image/png",  "png" ),
    ("image/gif",  "gif" ),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
    ("image/heic", "heic"),
    ("image/heif", "heif"),
];

/// One file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// File extension for the upload's content type, if it is an accepted image.
    pub fn extension(&self) -> Option<&'static str> {
        extension(&self.content_type)
    }
}

fn extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

fn check(name: &str, content_type: &str, size: usize) -> Result<&'static str, Error> {
    let ext = extension(content_type).ok_or_else(|| {
        Error::invalid(format!(
            "{}: unsupported file type '{}', only images are allowed",
            name, content_type
        ))
    })?;
    match size > hh_core::MAX_PHOTO_BYTES {
        true => Err(Error::invalid(format!(
            "{} is too large (max {} MB)",
            name,
            hh_core::MAX_PHOTO_BYTES / (1024 * 1024)
        ))),
        false => Ok(ext),
    }
}

/// Check every upload before any is stored. The first offender is named.
pub fn validate(uploads: &[Upload]) -> Result<(), Error> {
    if uploads.is_empty() {
        return Err(Error::invalid("no files uploaded"));
    }
    uploads
        .iter()
        .try_for_each(|u| check(&u.name, &u.content_type, u.bytes.len()).map(|_| ()))
}

/// Photo storage addressed by relative path, returning a public URL.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn store(&self, bytes: &[u8], content_type: &str, path: &str) -> Result<String, Error>;
}

/// Object store on the local filesystem, served back under `base`.
pub struct Disk {
    root: PathBuf,
    base: String,
}

impl Disk {
    pub fn new(root: impl Into<PathBuf>, base: &str) -> Self {
        Self {
            root: root.into(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    /// Resolve `path` under the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(path);
        match relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            true if !path.is_empty() => Ok(self.root.join(relative)),
            _ => Err(Error::invalid(format!("invalid storage path '{}'", path))),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for Disk {
    async fn store(&self, bytes: &[u8], content_type: &str, path: &str) -> Result<String, Error> {
        check(path, content_type, bytes.len())?;
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::internal(format!("create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| Error::internal(format!("write {}: {}", target.display(), e)))?;
        log::debug!("stored {} bytes at {}", bytes.len(), target.display());
        Ok(format!("{}/{}", self.base, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: &str, size: usize) -> Upload {
        Upload {
            name: name.into(),
            content_type: content_type.into(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn non_images_are_named() {
        let err = validate(&[
            upload("front.jpg", "image/jpeg", 10),
            upload("lease.pdf", "application/pdf", 10),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("lease.pdf"));
        assert!(err.to_string().contains("application/pdf"));
    }

    #[test]
    fn oversized_images_are_named() {
        let err = validate(&[upload("huge.png", "image/png", 11 * 1024 * 1024)]).unwrap_err();
        assert!(err.to_string().contains("huge.png"));
        assert!(err.to_string().contains("too large"));
        assert!(validate(&[upload("ok.png", "image/png", hh_core::MAX_PHOTO_BYTES)]).is_ok());
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(upload("a", "Image/JPEG; q=1", 1).extension(), Some("jpg"));
        assert_eq!(upload("a", "image/svg+xml", 1).extension(), None);
        assert!(validate(&[]).is_err());
    }

    #[tokio::test]
    async fn disk_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let disk = Disk::new(dir.path(), "/uploads/");
        let url = disk
            .store(b"pixels", "image/png", "listing/abc.png")
            .await
            .unwrap();
        assert_eq!(url, "/uploads/listing/abc.png");
        assert_eq!(
            std::fs::read(dir.path().join("listing/abc.png")).unwrap(),
            b"pixels"
        );
    }

    #[tokio::test]
    async fn disk_refuses_escapes_and_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let disk = Disk::new(dir.path(), "/uploads");
        assert!(disk.store(b"x", "image/png", "../evil.png").await.is_err());
        assert!(disk.store(b"x", "image/png", "/etc/evil.png").await.is_err());
        assert!(disk.store(b"x", "text/html", "page.html").await.is_err());
    }
}
