use std::path::{Path, PathBuf};

use flume::Sender;
use tokio::io::AsyncReadExt;

use crate::assets::server::{LoadId, LoadMessage};
use crate::errors::AssetError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Resolves asset paths against a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Absolute paths pass through; relative ones are joined onto the root.
    #[must_use]
    pub fn resolve(&self, uri: impl AsRef<Path>) -> PathBuf {
        self.root_path.join(uri)
    }
}

/// Reads a whole file in chunks, reporting progress after each one.
pub(crate) async fn read_with_progress(
    path: &Path,
    id: LoadId,
    progress: &Sender<LoadMessage>,
) -> Result<Vec<u8>, AssetError> {
    let read_error = |e: std::io::Error| AssetError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut file = tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound(path.to_path_buf())
        } else {
            read_error(e)
        }
    })?;
    let total = file.metadata().await.map_err(read_error)?.len();

    let mut bytes = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut chunk).await.map_err(read_error)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        // The receiver only disappears when the server is gone; nothing to report to then.
        let _ = progress.send(LoadMessage::Progress {
            id,
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}
