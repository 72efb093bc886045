use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender, TryRecvError};
use rustc_hash::FxHashMap;
use slotmap::new_key_type;
use tokio::runtime::Runtime;

use crate::assets::font::Font;
use crate::assets::io::{self, FileAssetReader};
use crate::assets::loaders::GltfLoader;
use crate::assets::prefab::Prefab;
use crate::assets::storage::AssetStorage;
use crate::assets::texture::{self, ColorSpace, Texture};
use crate::assets::tracker::{AssetEvent, LoadTracker};
use crate::errors::{AssetError, Result};

// Strongly-typed handles
new_key_type! {
    pub struct TextureHandle;
    pub struct FontHandle;
    pub struct PrefabHandle;
}

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(u64);

pub(crate) enum LoadedAsset {
    Texture(Texture),
    Font(Font),
    Model(Prefab),
}

/// Worker-to-server traffic. Workers never touch storage themselves.
pub(crate) enum LoadMessage {
    Progress {
        id: LoadId,
        loaded: u64,
        total: u64,
    },
    Finished {
        id: LoadId,
        result: std::result::Result<LoadedAsset, AssetError>,
    },
}

type Completion<H> = std::result::Result<H, AssetError>;

enum Completer {
    Texture(Sender<Completion<TextureHandle>>),
    Font(Sender<Completion<FontHandle>>),
    Model(Sender<Completion<PrefabHandle>>),
}

impl Completer {
    fn fail(self, error: AssetError) {
        // A dropped PendingAsset just means nobody is waiting.
        match self {
            Completer::Texture(tx) => drop(tx.send(Err(error))),
            Completer::Font(tx) => drop(tx.send(Err(error))),
            Completer::Model(tx) => drop(tx.send(Err(error))),
        }
    }
}

struct InFlight {
    path: PathBuf,
    completer: Completer,
}

/// The result of a load that may not have finished yet.
///
/// Resolves during the first [`AssetServer::pump`] after the worker is
/// done, which the scheduler calls at the start of every tick. Poll it with
/// [`PendingAsset::try_take`] from tick code, or `.await` it with
/// [`PendingAsset::wait`] while something else keeps pumping.
pub struct PendingAsset<H> {
    id: LoadId,
    path: PathBuf,
    rx: Receiver<Completion<H>>,
    taken: bool,
}

impl<H> PendingAsset<H> {
    #[must_use]
    pub fn id(&self) -> LoadId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the result has already been taken.
    #[must_use]
    pub fn is_taken(&self) -> bool {
        self.taken
    }

    /// Takes the result if the load has been resolved. Yields a value at most once.
    pub fn try_take(&mut self) -> Option<Completion<H>> {
        if self.taken {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(self.cancelled()),
        };
        self.taken = true;
        Some(result)
    }

    /// Waits for the result.
    pub async fn wait(self) -> Completion<H> {
        if self.taken {
            return Err(self.cancelled());
        }
        match self.rx.recv_async().await {
            Ok(result) => result,
            Err(_) => Err(self.cancelled()),
        }
    }

    fn cancelled(&self) -> AssetError {
        AssetError::Cancelled(self.path.display().to_string())
    }
}

/// Loads assets on a worker runtime and hands them over at tick boundaries.
///
/// Every `load_*` call returns immediately. Reading and decoding happen on
/// the server's own tokio runtime; finished work waits in a channel until
/// [`AssetServer::pump`] moves it into storage on the tick thread.
pub struct AssetServer {
    pub textures: Arc<AssetStorage<TextureHandle, Texture>>,
    pub fonts: Arc<AssetStorage<FontHandle, Font>>,
    pub prefabs: Arc<AssetStorage<PrefabHandle, Prefab>>,

    reader: FileAssetReader,
    runtime: Option<Runtime>,

    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
    in_flight: FxHashMap<LoadId, InFlight>,
    next_id: u64,

    tracker: LoadTracker,
    queued_events: Vec<AssetEvent>,
}

impl AssetServer {
    /// Starts a server with `worker_threads` loader threads, resolving relative paths against the working directory.
    pub fn new(worker_threads: usize) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("orrery-asset-worker")
            .build()?;
        let (tx, rx) = flume::unbounded();

        log::info!("Asset server started with {} worker threads", worker_threads.max(1));

        Ok(Self {
            textures: Arc::new(AssetStorage::new()),
            fonts: Arc::new(AssetStorage::new()),
            prefabs: Arc::new(AssetStorage::new()),

            reader: FileAssetReader::new("."),
            runtime: Some(runtime),

            tx,
            rx,
            in_flight: FxHashMap::default(),
            next_id: 0,

            tracker: LoadTracker::new(),
            queued_events: Vec::new(),
        })
    }

    /// Resolves relative asset paths against `root` instead of the working directory.
    #[must_use]
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.reader = FileAssetReader::new(root);
        self
    }

    #[must_use]
    pub fn root_path(&self) -> &Path {
        self.reader.root_path()
    }

    #[must_use]
    pub fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }

    /// Whether any load is still running or waiting to be pumped.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Stores a texture built in code (procedural maps, test patterns).
    pub fn add_texture(&self, texture: Texture) -> TextureHandle {
        self.textures.add_with_uuid(texture.uuid, texture)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn load_texture(
        &mut self,
        path: impl AsRef<Path>,
        color_space: ColorSpace,
    ) -> PendingAsset<TextureHandle> {
        let path = self.reader.resolve(path);
        let name = file_label(&path);
        let (tx, pending) = self.pending(&path);
        let progress = self.tx.clone();
        let id = pending.id;
        let job_path = path.clone();

        self.spawn(id, path, Completer::Texture(tx), async move {
            let bytes = io::read_with_progress(&job_path, id, &progress).await?;
            let texture = tokio::task::spawn_blocking(move || {
                texture::decode_texture(&bytes, &name, color_space)
            })
            .await??;
            Ok(LoadedAsset::Texture(texture))
        });
        pending
    }

    /// Loads six faces in +X, -X, +Y, -Y, +Z, -Z order. Progress is reported per face.
    pub fn load_cube_texture<P: AsRef<Path>>(
        &mut self,
        paths: [P; 6],
        color_space: ColorSpace,
    ) -> PendingAsset<TextureHandle> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| self.reader.resolve(p)).collect();
        let name = paths[0]
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str())
            .unwrap_or("CubeMap")
            .to_string();
        let (tx, pending) = self.pending(&paths[0]);
        let progress = self.tx.clone();
        let id = pending.id;
        let first = paths[0].clone();

        self.spawn(id, first, Completer::Texture(tx), async move {
            let reads = paths.iter().map(|p| io::read_with_progress(p, id, &progress));
            let files = futures::future::try_join_all(reads).await?;
            let texture = tokio::task::spawn_blocking(move || {
                let faces = files
                    .iter()
                    .map(|bytes| texture::decode_image(bytes))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                texture::assemble_cube(&name, faces, color_space)
            })
            .await??;
            Ok(LoadedAsset::Texture(texture))
        });
        pending
    }

    /// Loads a typeface JSON font.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> PendingAsset<FontHandle> {
        let path = self.reader.resolve(path);
        let (tx, pending) = self.pending(&path);
        let progress = self.tx.clone();
        let id = pending.id;
        let job_path = path.clone();

        self.spawn(id, path, Completer::Font(tx), async move {
            let bytes = io::read_with_progress(&job_path, id, &progress).await?;
            let font = tokio::task::spawn_blocking(move || Font::from_json_slice(&bytes)).await??;
            Ok(LoadedAsset::Font(font))
        });
        pending
    }

    /// Loads a `.gltf` or `.glb` model as a prefab.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> PendingAsset<PrefabHandle> {
        let path = self.reader.resolve(path);
        let name = file_label(&path);
        let (tx, pending) = self.pending(&path);
        let progress = self.tx.clone();
        let id = pending.id;
        let job_path = path.clone();

        self.spawn(id, path, Completer::Model(tx), async move {
            let bytes = io::read_with_progress(&job_path, id, &progress).await?;
            let prefab =
                tokio::task::spawn_blocking(move || GltfLoader::load_prefab(&bytes, &name)).await??;
            Ok(LoadedAsset::Model(prefab))
        });
        pending
    }

    fn pending<H>(&mut self, path: &Path) -> (Sender<Completion<H>>, PendingAsset<H>) {
        let id = LoadId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = flume::bounded(1);
        let pending = PendingAsset {
            id,
            path: path.to_path_buf(),
            rx,
            taken: false,
        };
        (tx, pending)
    }

    fn spawn<F>(&mut self, id: LoadId, path: PathBuf, completer: Completer, job: F)
    where
        F: Future<Output = std::result::Result<LoadedAsset, AssetError>> + Send + 'static,
    {
        log::debug!("Loading {}", path.display());
        self.tracker.on_start(id);
        self.queued_events.push(AssetEvent::Started {
            id,
            path: path.clone(),
        });
        self.in_flight.insert(id, InFlight { path, completer });

        let tx = self.tx.clone();
        match &self.runtime {
            Some(runtime) => {
                runtime.spawn(async move {
                    let result = job.await;
                    let _ = tx.send(LoadMessage::Finished { id, result });
                });
            }
            None => {
                let _ = tx.send(LoadMessage::Finished {
                    id,
                    result: Err(AssetError::Cancelled("asset server is shut down".to_string())),
                });
            }
        }
    }

    // ========================================================================
    // Completion
    // ========================================================================

    /// Applies every finished load: stores the asset and resolves its
    /// [`PendingAsset`]. Never blocks.
    pub fn pump(&mut self) -> Vec<AssetEvent> {
        let mut events = std::mem::take(&mut self.queued_events);
        while let Ok(message) = self.rx.try_recv() {
            self.handle(message, &mut events);
        }
        events
    }

    /// Blocks until every running load has been applied, or `timeout` runs out.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> Vec<AssetEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = self.pump();
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(message) => self.handle(message, &mut events),
                Err(_) => {
                    log::warn!("Timed out waiting for {} asset loads", self.in_flight.len());
                    break;
                }
            }
        }
        events
    }

    fn handle(&mut self, message: LoadMessage, events: &mut Vec<AssetEvent>) {
        match message {
            LoadMessage::Progress { id, loaded, total } => {
                self.tracker.on_progress(id, loaded, total);
                events.push(AssetEvent::Progress { id, loaded, total });
            }
            LoadMessage::Finished { id, result } => {
                let Some(InFlight { path, completer }) = self.in_flight.remove(&id) else {
                    return;
                };
                let ok = match self.complete(completer, result) {
                    Ok(()) => {
                        log::info!("Loaded {}", path.display());
                        events.push(AssetEvent::Loaded { id, path });
                        true
                    }
                    Err(error) => {
                        log::error!("Failed to load {}: {error}", path.display());
                        events.push(AssetEvent::Failed { id, path, error });
                        false
                    }
                };
                if self.tracker.on_finish(id, ok) {
                    events.push(AssetEvent::AllSettled {
                        loaded: self.tracker.items_loaded(),
                        failed: self.tracker.items_failed(),
                    });
                }
            }
        }
    }

    fn complete(
        &self,
        completer: Completer,
        result: std::result::Result<LoadedAsset, AssetError>,
    ) -> std::result::Result<(), AssetError> {
        match (completer, result) {
            (Completer::Texture(tx), Ok(LoadedAsset::Texture(texture))) => {
                let _ = tx.send(Ok(self.add_texture(texture)));
            }
            (Completer::Font(tx), Ok(LoadedAsset::Font(font))) => {
                let _ = tx.send(Ok(self.fonts.add(font)));
            }
            (Completer::Model(tx), Ok(LoadedAsset::Model(prefab))) => {
                let _ = tx.send(Ok(self.prefabs.add(prefab)));
            }
            (completer, Ok(_)) => {
                let error = AssetError::Format("loader produced a different asset kind".to_string());
                completer.fail(error.clone());
                return Err(error);
            }
            (completer, Err(error)) => {
                completer.fail(error.clone());
                return Err(error);
            }
        }
        Ok(())
    }

    /// Stops the worker runtime. Loads still running are cancelled and
    /// resolve with [`AssetError::Cancelled`].
    pub fn shutdown(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(Duration::from_secs(1));
            for (_, InFlight { completer, path }) in self.in_flight.drain() {
                completer.fail(AssetError::Cancelled(path.display().to_string()));
            }
            log::info!("Asset server shut down");
        }
    }
}

impl Drop for AssetServer {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
