//! Attachment fetcher: download a resource into a scoped temporary file.
//!
//! Every download gets a fresh `TempDir`. The directory lives inside the
//! returned [`LocalResource`], so the file is removed when the resource is
//! dropped, whether the upload succeeded, failed, or the task panicked.

use crate::error::MigrationError;
use crate::pipeline::attachments::{file_name_from_locator, guess_mime};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A downloaded file, alive until dropped.
#[derive(Debug)]
pub struct LocalResource {
    path: PathBuf,
    mimetype: String,
    _dir: TempDir,
}

impl LocalResource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
    }

    /// Write `bytes` to a new temporary file called `name`.
    pub async fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, MigrationError> {
        let (dir, path) = temp_path(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| MigrationError::TempFile {
                name: name.to_string(),
                source,
            })?;
        Ok(Self {
            mimetype: guess_mime(name).to_string(),
            path,
            _dir: dir,
        })
    }
}

fn temp_path(name: &str) -> Result<(TempDir, PathBuf), MigrationError> {
    let dir = TempDir::new().map_err(|source| MigrationError::TempFile {
        name: name.to_string(),
        source,
    })?;
    let path = dir.path().join(name);
    Ok((dir, path))
}

/// Basic-auth credentials sent with a download.
#[derive(Debug, Clone, Copy)]
pub struct BasicAuth<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Stream `url` into a temporary file.
///
/// Any non-2xx status is a [`MigrationError::Transport`]; exceeding
/// `timeout_secs` is a [`MigrationError::TransportTimeout`].
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    auth: Option<BasicAuth<'_>>,
    timeout_secs: u64,
) -> Result<LocalResource, MigrationError> {
    debug!("Downloading {}", url);

    let transport = |e: reqwest::Error| {
        if e.is_timeout() {
            MigrationError::TransportTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MigrationError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let mut request = client
        .get(url)
        .timeout(Duration::from_secs(timeout_secs));
    if let Some(auth) = auth {
        request = request.basic_auth(auth.username, Some(auth.password));
    }
    let response = request.send().await.map_err(transport)?;

    if !response.status().is_success() {
        return Err(MigrationError::Transport {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let name = file_name_from_locator(url);
    let (dir, path) = temp_path(&name)?;
    let temp_err = |source: std::io::Error| MigrationError::TempFile {
        name: name.clone(),
        source,
    };

    let mut file = tokio::fs::File::create(&path).await.map_err(temp_err)?;
    let mut body = response.bytes_stream();
    let mut written = 0usize;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(transport)?;
        written += chunk.len();
        file.write_all(&chunk).await.map_err(temp_err)?;
    }
    file.flush().await.map_err(temp_err)?;

    debug!("Downloaded {} bytes to {}", written, path.display());

    Ok(LocalResource {
        mimetype: guess_mime(&name).to_string(),
        path,
        _dir: dir,
    })
}
