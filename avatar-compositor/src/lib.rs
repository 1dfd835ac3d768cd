//! # Avatar Compositor
//!
//! Async compositing session for the avatar editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  commands   ┌─────────────────────────────────┐
//! │  Compositor  │ ──────────▶ │ worker task                     │
//! │  (cloneable) │ ◀────────── │  Session · Surface · Renderer   │
//! └──────┬───────┘   replies   │  RasterCache                    │
//!        │                     └──────┬──────────────┬───────────┘
//!        │ subscribe                  │ fetch        │ save
//!        ▼                            ▼              ▼
//!   Notifications               AssetSource     DownloadSink
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use avatar_compositor::{
//!     Compositor, CompositorConfig, DirAssetSource, MemoryDownloadSink, UploadedFile,
//! };
//! use avatar_renderer::FramebufferBackend;
//!
//! # async fn run() -> avatar_compositor::CompositorResult<()> {
//! let config = CompositorConfig::from_env();
//! let (compositor, _task) = Compositor::spawn(
//!     config.clone(),
//!     Arc::new(DirAssetSource::new(config.asset_root.clone())),
//!     Arc::new(MemoryDownloadSink::new()),
//! );
//!
//! let target = Box::new(FramebufferBackend::new(config.width, config.height));
//! compositor
//!     .initialize_surface(Some(target), config.width, config.height)
//!     .await?;
//! let photo = std::fs::read("me.png").unwrap_or_default();
//! compositor
//!     .load_base_image(vec![UploadedFile::new("me.png", photo)])
//!     .await?;
//! compositor.add_asset("/0g_glasses.png", "Glasses").await?;
//! compositor.export(None).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod asset;
pub mod compositor;
pub mod config;
pub mod download;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod telemetry;

pub use asset::{AssetError, AssetSource, DirAssetSource, MemoryAssetSource};
pub use compositor::{Compositor, ExportReceipt, SessionSnapshot, UploadedFile};
pub use config::{CompositorConfig, DEFAULT_ASSET_ROOT, DEFAULT_EXPORT_NAME};
pub use download::{DirDownloadSink, Download, DownloadSink, MemoryDownloadSink};
pub use error::{CompositorError, CompositorResult};
pub use notify::Notifier;
pub use telemetry::init_tracing;
