//! The canvas compositor.
//!
//! A [`Compositor`] is a cheap, cloneable handle. Every operation becomes a
//! command on one unbounded queue drained by a single worker task, which owns
//! the [`Session`], the optional surface and the decoded asset cache. Commands
//! are applied strictly in submission order, so two rapid adds always stack
//! in the order they were issued no matter which decode would finish first.

use std::path::PathBuf;
use std::sync::Arc;

use avatar_core::{
    AssetCatalog, Notification, ObjectId, ObjectSource, PlacedObject, Raster, Session,
    SessionPhase, Surface, SurfaceSummary,
};
use avatar_renderer::image::{decode_image, decode_upload, is_image_mime};
use avatar_renderer::{
    FramebufferBackend, RasterCache, RenderBackend, RenderError, RenderResult, Renderer,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::asset::{AssetError, AssetSource, DirAssetSource};
use crate::config::CompositorConfig;
use crate::download::{DirDownloadSink, DownloadSink};
use crate::error::{CompositorError, CompositorResult};
use crate::metrics;
use crate::notify::Notifier;

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as reported by the picker.
    pub name: String,
    /// Advertised MIME type, if the picker reported one.
    pub mime: Option<String>,
    /// Raw image bytes or a `data:` URL.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// A file without an advertised MIME type.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    /// Set the advertised MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    /// Name the download was saved under.
    pub file_name: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Size of the PNG in bytes.
    pub size_bytes: usize,
}

/// Serializable view of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// File whose decode is in flight.
    ///
    /// An upload begins and finishes within one command, and snapshots are
    /// taken between commands, so this is always `None` here. It is kept so
    /// the snapshot mirrors [`Session`].
    pub pending_upload: Option<String>,
    /// The surface, if one exists.
    pub surface: Option<SurfaceSummary>,
    /// Frames presented by the current surface.
    pub frame_count: u64,
}

type Reply<T> = oneshot::Sender<CompositorResult<T>>;

enum Command {
    Initialize {
        target: Option<Box<dyn RenderBackend>>,
        width: u32,
        height: u32,
        reply: Reply<bool>,
    },
    LoadBaseImage {
        files: Vec<UploadedFile>,
        reply: Reply<Option<ObjectId>>,
    },
    AddAsset {
        url: String,
        display_name: String,
        reply: Reply<ObjectId>,
    },
    Clear {
        reply: Reply<usize>,
    },
    Export {
        file_name: Option<String>,
        reply: Reply<ExportReceipt>,
    },
    BringToFront {
        id: ObjectId,
        reply: Reply<()>,
    },
    CenterObject {
        id: ObjectId,
        reply: Reply<()>,
    },
    SetActive {
        id: ObjectId,
        reply: Reply<()>,
    },
    MoveObject {
        id: ObjectId,
        x: f32,
        y: f32,
        reply: Reply<()>,
    },
    ScaleObject {
        id: ObjectId,
        factor: f32,
        reply: Reply<()>,
    },
    SelectAt {
        x: f32,
        y: f32,
        reply: Reply<Option<ObjectId>>,
    },
    Snapshot {
        reply: Reply<SessionSnapshot>,
    },
    Release {
        reply: Reply<()>,
    },
}

/// Handle to a compositing session.
#[derive(Clone)]
pub struct Compositor {
    tx: mpsc::UnboundedSender<Command>,
    notifier: Notifier,
}

impl Compositor {
    /// Start the worker task on the current tokio runtime.
    ///
    /// The worker stops, releasing its surface, once every handle is dropped;
    /// the returned [`JoinHandle`] resolves at that point.
    #[must_use]
    pub fn spawn(
        config: CompositorConfig,
        assets: Arc<dyn AssetSource>,
        downloads: Arc<dyn DownloadSink>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new();
        let worker = Worker {
            cache: RasterCache::with_config(config.cache_config()),
            config,
            session: Session::new(),
            surface: None,
            assets,
            downloads,
            notifier: notifier.clone(),
        };
        let task = tokio::spawn(worker.run(rx));
        (Self { tx, notifier }, task)
    }

    /// Start a compositor that reads assets from `config.asset_root` and saves
    /// exports into `download_dir`.
    #[must_use]
    pub fn spawn_local(
        config: CompositorConfig,
        download_dir: impl Into<PathBuf>,
    ) -> (Self, JoinHandle<()>) {
        let assets = Arc::new(DirAssetSource::new(config.asset_root.clone()));
        let downloads = Arc::new(DirDownloadSink::new(download_dir));
        Self::spawn(config, assets, downloads)
    }

    /// Receive notifications sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> CompositorResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .map_err(|_| CompositorError::Closed)?;
        rx.await.map_err(|_| CompositorError::Closed)?
    }

    /// Create the surface on `target` at a fixed pixel size, releasing any
    /// existing surface first.
    ///
    /// Returns `Ok(false)` without touching the current surface when no target
    /// is available.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero-sized surface or if the first frame cannot be drawn.
    pub async fn initialize_surface(
        &self,
        target: Option<Box<dyn RenderBackend>>,
        width: u32,
        height: u32,
    ) -> CompositorResult<bool> {
        self.request(|reply| Command::Initialize {
            target,
            width,
            height,
            reply,
        })
        .await
    }

    /// Decode the first selected file and place it centered and active.
    ///
    /// Creates a headless surface at the configured size if none exists yet.
    /// Returns `Ok(None)` when no file was selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not an image or cannot be decoded.
    pub async fn load_base_image(
        &self,
        files: Vec<UploadedFile>,
    ) -> CompositorResult<Option<ObjectId>> {
        self.request(|reply| Command::LoadBaseImage { files, reply })
            .await
    }

    /// Place a catalog asset on top, centered and active.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::NotInitialized`] without a surface, or an
    /// error if the asset cannot be fetched or decoded.
    pub async fn add_asset(
        &self,
        url: impl Into<String>,
        display_name: impl Into<String>,
    ) -> CompositorResult<ObjectId> {
        let (url, display_name) = (url.into(), display_name.into());
        self.request(|reply| Command::AddAsset {
            url,
            display_name,
            reply,
        })
        .await
    }

    /// Place a built-in catalog asset under its catalog display name.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] for a URL outside the catalog, and
    /// otherwise fails like [`Compositor::add_asset`].
    pub async fn add_catalog_asset(&self, url: &str) -> CompositorResult<ObjectId> {
        let Some(asset) = AssetCatalog::builtin().find(url) else {
            let err = CompositorError::from(AssetError::NotFound(url.to_string()));
            tracing::warn!("{err}");
            self.notifier.send(Notification::error(err.to_string()));
            return Err(err);
        };
        self.add_asset(asset.url, asset.display_name).await
    }

    /// Remove every object and return the session to its empty phase.
    ///
    /// Returns the number of objects removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty frame cannot be drawn.
    pub async fn clear(&self) -> CompositorResult<usize> {
        self.request(|reply| Command::Clear { reply }).await
    }

    /// Encode the surface as PNG and save it under `file_name` (or the
    /// configured default).
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::NotInitialized`] without a surface, or an
    /// error if encoding or saving fails.
    pub async fn export(&self, file_name: Option<&str>) -> CompositorResult<ExportReceipt> {
        let file_name = file_name.map(str::to_string);
        self.request(|reply| Command::Export { file_name, reply })
            .await
    }

    /// Move an object to the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error without a surface or if the object is unknown.
    pub async fn bring_to_front(&self, id: ObjectId) -> CompositorResult<()> {
        self.request(|reply| Command::BringToFront { id, reply })
            .await
    }

    /// Center an object on the surface.
    ///
    /// # Errors
    ///
    /// Returns an error without a surface or if the object is unknown.
    pub async fn center_object(&self, id: ObjectId) -> CompositorResult<()> {
        self.request(|reply| Command::CenterObject { id, reply })
            .await
    }

    /// Make an object the active one.
    ///
    /// # Errors
    ///
    /// Returns an error without a surface or if the object is unknown.
    pub async fn set_active(&self, id: ObjectId) -> CompositorResult<()> {
        self.request(|reply| Command::SetActive { id, reply }).await
    }

    /// Move an object's top-left corner to `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error without a surface or if the object is unknown.
    pub async fn move_object(&self, id: ObjectId, x: f32, y: f32) -> CompositorResult<()> {
        self.request(|reply| Command::MoveObject { id, x, y, reply })
            .await
    }

    /// Scale an object around its center.
    ///
    /// # Errors
    ///
    /// Returns an error without a surface, for an unknown object or an invalid factor.
    pub async fn scale_object(&self, id: ObjectId, factor: f32) -> CompositorResult<()> {
        self.request(|reply| Command::ScaleObject { id, factor, reply })
            .await
    }

    /// Select the topmost object under `(x, y)`; empty space clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::NotInitialized`] without a surface.
    pub async fn select_at(&self, x: f32, y: f32) -> CompositorResult<Option<ObjectId>> {
        self.request(|reply| Command::SelectAt { x, y, reply })
            .await
    }

    /// Describe the current session and surface.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::Closed`] if the worker has stopped.
    pub async fn snapshot(&self) -> CompositorResult<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Release the surface and reset the session.
    ///
    /// # Errors
    ///
    /// Returns [`CompositorError::Closed`] if the worker has stopped.
    pub async fn release(&self) -> CompositorResult<()> {
        self.request(|reply| Command::Release { reply }).await
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("closed", &self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

/// A surface together with the renderer drawing it.
///
/// Dropping it releases the renderer's backend.
struct LiveSurface {
    surface: Surface,
    renderer: Renderer,
}

impl LiveSurface {
    fn new(
        config: &CompositorConfig,
        surface: Surface,
        backend: Box<dyn RenderBackend>,
    ) -> RenderResult<Self> {
        let renderer = Renderer::new(
            config.renderer_config(),
            backend,
            surface.width(),
            surface.height(),
        )?;
        let mut live = Self { surface, renderer };
        live.redraw()?;
        Ok(live)
    }

    fn redraw(&mut self) -> RenderResult<()> {
        metrics::set_surface_objects(self.surface.len());
        self.renderer.render(&self.surface)
    }
}

struct Worker {
    config: CompositorConfig,
    session: Session,
    surface: Option<LiveSurface>,
    assets: Arc<dyn AssetSource>,
    downloads: Arc<dyn DownloadSink>,
    notifier: Notifier,
    cache: RasterCache,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("Compositor started");
        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }
        if self.surface.take().is_some() {
            tracing::debug!("Compositor stopped; surface released");
        } else {
            tracing::debug!("Compositor stopped");
        }
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Initialize {
                target,
                width,
                height,
                reply,
            } => {
                let result = self.initialize(target, width, height);
                self.finish("initialize_surface", result, reply);
            }
            Command::LoadBaseImage { files, reply } => {
                let result = self.load_base_image(files).await;
                self.finish("load_base_image", result, reply);
            }
            Command::AddAsset {
                url,
                display_name,
                reply,
            } => {
                let result = self.add_asset(url, display_name).await;
                self.finish("add_asset", result, reply);
            }
            Command::Clear { reply } => {
                let result = self.clear();
                self.finish("clear", result, reply);
            }
            Command::Export { file_name, reply } => {
                let result = self.export(file_name).await;
                metrics::record_export(result.is_ok());
                self.finish("export", result, reply);
            }
            Command::BringToFront { id, reply } => {
                let result = self.edit(|s| s.bring_to_front(id));
                self.finish("bring_to_front", result, reply);
            }
            Command::CenterObject { id, reply } => {
                let result = self.edit(|s| s.center_object(id));
                self.finish("center_object", result, reply);
            }
            Command::SetActive { id, reply } => {
                let result = self.edit(|s| s.set_active(id));
                self.finish("set_active", result, reply);
            }
            Command::MoveObject { id, x, y, reply } => {
                let result = self.edit(|s| s.move_object(id, x, y));
                self.finish("move_object", result, reply);
            }
            Command::ScaleObject { id, factor, reply } => {
                let result = self.edit(|s| s.scale_object(id, factor));
                self.finish("scale_object", result, reply);
            }
            Command::SelectAt { x, y, reply } => {
                let result = self.select_at(x, y);
                self.finish("select_at", result, reply);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(Ok(self.snapshot()));
            }
            Command::Release { reply } => {
                self.release();
                let _ = reply.send(Ok(()));
            }
        }
    }

    /// Log a failure, notify the user where they should hear about it, and
    /// hand the result back to the caller.
    fn finish<T>(&self, operation: &'static str, result: CompositorResult<T>, reply: Reply<T>) {
        if let Err(err) = &result {
            match err {
                CompositorError::ObjectNotFound(_) | CompositorError::Model(_) => {
                    tracing::warn!(operation, "{err}");
                }
                CompositorError::NotInitialized => {
                    tracing::warn!(operation, "{err}");
                    self.notifier.send(Notification::not_initialized());
                }
                CompositorError::Decode { name, .. } => {
                    tracing::error!(operation, "{err}");
                    self.notifier.send(Notification::decode_failed(name));
                }
                _ => {
                    tracing::error!(operation, "{err}");
                    self.notifier.send(Notification::error(err.to_string()));
                }
            }
        }
        // The caller may have stopped waiting; the operation still happened.
        let _ = reply.send(result);
    }

    fn initialize(
        &mut self,
        target: Option<Box<dyn RenderBackend>>,
        width: u32,
        height: u32,
    ) -> CompositorResult<bool> {
        let Some(backend) = target else {
            tracing::warn!("No drawing target available; surface initialization skipped");
            return Ok(false);
        };

        let surface = Surface::new(width, height)?;
        if self.surface.take().is_some() {
            tracing::debug!("Released previous surface before re-initializing");
        }

        self.surface = Some(LiveSurface::new(&self.config, surface, backend)?);
        metrics::record_surface_initialized();
        tracing::info!("Surface initialized at {width}x{height}");
        Ok(true)
    }

    fn ensure_surface(&mut self) -> CompositorResult<&mut LiveSurface> {
        if self.surface.is_none() {
            let (width, height) = (self.config.width, self.config.height);
            tracing::debug!("Creating {width}x{height} surface for the first image");
            let surface = Surface::new(width, height)?;
            let backend = Box::new(FramebufferBackend::new(width, height));
            self.surface = Some(LiveSurface::new(&self.config, surface, backend)?);
            metrics::record_surface_initialized();
        }
        self.surface.as_mut().ok_or(CompositorError::NotInitialized)
    }

    async fn load_base_image(
        &mut self,
        files: Vec<UploadedFile>,
    ) -> CompositorResult<Option<ObjectId>> {
        let mut files = files.into_iter();
        let Some(file) = files.next() else {
            tracing::warn!("No file selected");
            return Ok(None);
        };
        let ignored = files.count();
        if ignored > 0 {
            tracing::warn!("{ignored} additional selected files ignored");
        }

        if let Some(mime) = file.mime.as_deref().filter(|m| !is_image_mime(m)) {
            return Err(CompositorError::UnsupportedMedia {
                file_name: file.name,
                mime: mime.to_string(),
            });
        }

        self.session.begin_upload(file.name.as_str());
        let raster = match decode_off_thread(file.bytes, decode_upload).await {
            Ok(raster) => raster,
            Err(source) => {
                self.session.finish_upload(false);
                metrics::record_decode_failure("upload");
                return Err(CompositorError::Decode {
                    name: file.name,
                    source,
                });
            }
        };

        tracing::debug!(
            "Decoded upload {} ({}x{})",
            file.name,
            raster.width(),
            raster.height()
        );
        let object = PlacedObject::new(
            ObjectSource::Upload {
                file_name: file.name,
            },
            raster,
        );

        let placed = self.ensure_surface().and_then(|live| {
            let id = live.surface.add(object);
            live.surface.set_active(id)?;
            live.surface.center_object(id)?;
            Ok(id)
        });
        self.session.finish_upload(placed.is_ok());
        let id = placed?;

        metrics::record_object_added("upload");
        if let Some(live) = self.surface.as_mut() {
            live.redraw()?;
        }
        Ok(Some(id))
    }

    async fn add_asset(&mut self, url: String, display_name: String) -> CompositorResult<ObjectId> {
        if self.surface.is_none() {
            return Err(CompositorError::NotInitialized);
        }

        let raster = self.asset_raster(&url).await?;
        let live = self
            .surface
            .as_mut()
            .ok_or(CompositorError::NotInitialized)?;

        let added = Notification::asset_added(&display_name);
        let id = live.surface.add(PlacedObject::new(
            ObjectSource::Asset { url, display_name },
            raster,
        ));
        live.surface.bring_to_front(id)?;
        live.surface.set_active(id)?;
        live.surface.center_object(id)?;
        live.redraw()?;

        metrics::record_object_added("asset");
        self.notifier.send(added);
        Ok(id)
    }

    async fn asset_raster(&mut self, url: &str) -> CompositorResult<Raster> {
        if let Some(raster) = self.cache.get(url) {
            tracing::trace!("Asset cache hit: {url}");
            return Ok(raster);
        }

        let bytes = self.assets.fetch(url).await?;
        let raster = decode_off_thread(bytes, decode_image)
            .await
            .map_err(|source| {
                metrics::record_decode_failure("asset");
                CompositorError::Decode {
                    name: url.to_string(),
                    source,
                }
            })?;
        self.cache.insert(url, raster.clone());
        Ok(raster)
    }

    fn clear(&mut self) -> CompositorResult<usize> {
        self.session.reset();
        let Some(live) = self.surface.as_mut() else {
            tracing::debug!("Clear requested without a surface");
            return Ok(0);
        };
        let removed = live.surface.clear();
        live.redraw()?;
        tracing::debug!("Cleared {removed} objects");
        Ok(removed)
    }

    async fn export(&mut self, file_name: Option<String>) -> CompositorResult<ExportReceipt> {
        let file_name = file_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.config.default_export_name.clone());

        let (png, width, height) = {
            let live = self
                .surface
                .as_ref()
                .ok_or(CompositorError::NotInitialized)?;
            let png = live.renderer.export_png(&live.surface)?;
            (png, live.surface.width(), live.surface.height())
        };

        self.downloads
            .save(&file_name, &png)
            .await
            .map_err(|source| CompositorError::Download {
                file_name: file_name.clone(),
                source,
            })?;

        tracing::info!("Exported {width}x{height} PNG as {file_name}");
        self.notifier
            .send(Notification::download_succeeded(&file_name));
        Ok(ExportReceipt {
            file_name,
            width,
            height,
            size_bytes: png.len(),
        })
    }

    fn edit(
        &mut self,
        change: impl FnOnce(&mut Surface) -> avatar_core::AvatarResult<()>,
    ) -> CompositorResult<()> {
        let live = self
            .surface
            .as_mut()
            .ok_or(CompositorError::NotInitialized)?;
        change(&mut live.surface)?;
        live.redraw()?;
        Ok(())
    }

    fn select_at(&mut self, x: f32, y: f32) -> CompositorResult<Option<ObjectId>> {
        let live = self
            .surface
            .as_mut()
            .ok_or(CompositorError::NotInitialized)?;
        match live.surface.object_at(x, y) {
            Some(id) => {
                live.surface.set_active(id)?;
                Ok(Some(id))
            }
            None => {
                live.surface.discard_active();
                Ok(None)
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.session.phase(),
            pending_upload: self.session.pending_upload().map(str::to_string),
            surface: self.surface.as_ref().map(|live| live.surface.summary()),
            frame_count: self
                .surface
                .as_ref()
                .map_or(0, |live| live.renderer.frame_count()),
        }
    }

    fn release(&mut self) {
        if self.surface.take().is_some() {
            tracing::info!("Surface released");
        }
        self.session.reset();
    }
}

/// Run a decoder on the blocking pool so the worker keeps its runtime thread free.
async fn decode_off_thread(
    bytes: Vec<u8>,
    decode: fn(&[u8]) -> RenderResult<Raster>,
) -> RenderResult<Raster> {
    tokio::task::spawn_blocking(move || decode(&bytes))
        .await
        .map_err(|e| RenderError::Decode(format!("decode task failed: {e}")))?
}
