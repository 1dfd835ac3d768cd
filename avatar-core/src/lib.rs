//! # Avatar Core
//!
//! Model for layered avatar compositing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 avatar-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Surface          │  Session                │
//! │  - Placed objects │  - Empty / ImagePresent │
//! │  - Z-order        │  - Pending upload       │
//! │  - Active object  │                         │
//! ├─────────────────────────────────────────────┤
//! │  Asset catalog    │  Notifications          │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod error;
pub mod notification;
pub mod object;
pub mod raster;
pub mod session;
pub mod surface;

pub use catalog::{Asset, AssetCatalog};
pub use error::{AvatarError, AvatarResult};
pub use notification::{Notification, NotificationLevel};
pub use object::{ObjectId, ObjectSource, PlacedObject, Transform, MAX_SCALED_SIDE};
pub use raster::Raster;
pub use session::{Session, SessionPhase};
pub use surface::{ObjectSummary, Surface, SurfaceSummary, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Avatar core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
