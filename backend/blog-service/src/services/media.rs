use crate::config::MediaConfig;
use crate::error::{AppError, Result};
use rand::{distributions::Alphanumeric, Rng};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Subdirectory of the media root that post images are written to.
pub const POST_IMAGE_DIR: &str = "posts";

const SUFFIX_LEN: usize = 7;
const MAX_ATTEMPTS: usize = 8;
/// Width of `posts.image`; stored paths never exceed it.
pub const MAX_STORED_PATH_LEN: usize = 100;
const MAX_EXT_LEN: usize = 10;

/// Writes uploaded images beneath the media root.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Public URL of a stored path such as `posts/cat.png`.
    pub fn url(path: &str) -> String {
        format!("/media/{path}")
    }

    /// Store `bytes` as `posts/<name>` and return that relative path. A taken
    /// name gets a random suffix before the extension; a long stem is cut so
    /// the path fits in [`MAX_STORED_PATH_LEN`].
    pub async fn save_post_image(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let dir = self.root.join(POST_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cannot create {:?}: {}", dir, e)))?;

        let (stem, ext) = split_name(&sanitize_filename(filename));
        let mut candidate = join_name(&stem, None, &ext);

        for _ in 0..MAX_ATTEMPTS {
            let path = dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await.map_err(|e| {
                        AppError::Internal(anyhow::anyhow!("Cannot write {:?}: {}", path, e))
                    })?;
                    file.flush().await.map_err(|e| {
                        AppError::Internal(anyhow::anyhow!("Cannot write {:?}: {}", path, e))
                    })?;

                    let stored = format!("{POST_IMAGE_DIR}/{candidate}");
                    tracing::debug!(path = %stored, size = bytes.len(), "Stored post image");
                    return Ok(stored);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = join_name(&stem, Some(&random_suffix()), &ext);
                }
                Err(e) => {
                    return Err(AppError::Internal(anyhow::anyhow!(
                        "Cannot open {:?}: {}",
                        path,
                        e
                    )))
                }
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "No free file name for upload {filename}"
        )))
    }

    /// Delete a file written by [`save_post_image`](Self::save_post_image)
    /// whose post was never stored. Failures are logged, not returned.
    pub async fn remove(&self, stored: &str) {
        let path = self.root.join(stored);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %stored, "Removed unused post image"),
            Err(e) => tracing::warn!(path = %stored, error = %e, "Cannot remove unused post image"),
        }
    }
}

/// Reduce an uploaded name to its basename made of `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn split_name(name: &str) -> (String, String) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
        _ => (name.to_string(), String::new()),
    }
}

/// `stem[_suffix][.ext]`, with the stem shortened to fit the stored path.
/// Sanitized names are ASCII, so byte slicing is safe.
fn join_name(stem: &str, suffix: Option<&str>, ext: &str) -> String {
    let ext = &ext[..ext.len().min(MAX_EXT_LEN)];
    let reserved = POST_IMAGE_DIR.len()
        + 1
        + suffix.map_or(0, |s| s.len() + 1)
        + if ext.is_empty() { 0 } else { ext.len() + 1 };
    let budget = MAX_STORED_PATH_LEN.saturating_sub(reserved).max(1);

    let mut name = stem[..stem.len().min(budget)].to_string();
    if let Some(suffix) = suffix {
        name.push('_');
        name.push_str(suffix);
    }
    if !ext.is_empty() {
        name.push('.');
        name.push_str(ext);
    }
    name
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &tempfile::TempDir) -> MediaStorage {
        MediaStorage::new(&MediaConfig {
            root: dir.path().to_string_lossy().into_owned(),
            max_upload_bytes: 1024,
        })
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("small.gif"), "small.gif");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\pics\\my cat.png"), "my_cat.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[tokio::test]
    async fn saves_under_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = storage(&dir).save_post_image("small.gif", b"GIF89a").await.unwrap();

        assert_eq!(path, "posts/small.gif");
        let written = std::fs::read(dir.path().join(&path)).unwrap();
        assert_eq!(written, b"GIF89a");
    }

    #[tokio::test]
    async fn taken_name_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let media = storage(&dir);
        let first = media.save_post_image("small.gif", b"one").await.unwrap();
        let second = media.save_post_image("small.gif", b"two").await.unwrap();

        assert_ne!(first, second);
        assert!(second.starts_with("posts/small_"));
        assert!(second.ends_with(".gif"));
        assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"one");
    }

    #[tokio::test]
    async fn long_names_fit_the_image_column() {
        let dir = tempfile::tempdir().unwrap();
        let media = storage(&dir);
        let filename = format!("{}.png", "a".repeat(150));

        let first = media.save_post_image(&filename, b"one").await.unwrap();
        let second = media.save_post_image(&filename, b"two").await.unwrap();

        for stored in [&first, &second] {
            assert!(stored.len() <= MAX_STORED_PATH_LEN, "{stored}");
            assert!(stored.starts_with("posts/aaaa"));
            assert!(stored.ends_with(".png"));
            assert!(dir.path().join(stored).exists());
        }
        assert_ne!(first, second);
        assert_eq!(first.len(), MAX_STORED_PATH_LEN);
    }

    #[test]
    fn long_extension_is_cut() {
        let name = join_name("cat", None, &"x".repeat(200));
        assert_eq!(name, format!("cat.{}", "x".repeat(MAX_EXT_LEN)));
    }

    #[tokio::test]
    async fn remove_deletes_a_saved_image() {
        let dir = tempfile::tempdir().unwrap();
        let media = storage(&dir);
        let path = media.save_post_image("small.gif", b"GIF89a").await.unwrap();

        media.remove(&path).await;
        assert!(!dir.path().join(&path).exists());
        // A second removal only logs.
        media.remove(&path).await;
    }

    #[test]
    fn url_is_under_media() {
        assert_eq!(MediaStorage::url("posts/a.png"), "/media/posts/a.png");
    }
}
