//! Compositor metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops unless the host
//! installs a recorder.

use metrics::{counter, gauge};

const OBJECTS_ADDED_TOTAL: &str = "avatar_objects_added_total";
const DECODE_FAILURES_TOTAL: &str = "avatar_decode_failures_total";
const EXPORTS_TOTAL: &str = "avatar_exports_total";
const SURFACES_INITIALIZED_TOTAL: &str = "avatar_surfaces_initialized_total";
const SURFACE_OBJECTS: &str = "avatar_surface_objects";

/// Record a placed object. `origin` is `"upload"` or `"asset"`.
pub fn record_object_added(origin: &'static str) {
    counter!(OBJECTS_ADDED_TOTAL, "origin" => origin).increment(1);
}

/// Record an image that failed to decode.
pub fn record_decode_failure(origin: &'static str) {
    counter!(DECODE_FAILURES_TOTAL, "origin" => origin).increment(1);
}

/// Record an export attempt and whether it reached the download sink.
pub fn record_export(success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(EXPORTS_TOTAL, "status" => status).increment(1);
}

/// Record a surface (re)initialization.
pub fn record_surface_initialized() {
    counter!(SURFACES_INITIALIZED_TOTAL).increment(1);
}

/// Update the number of objects on the surface.
#[allow(clippy::cast_precision_loss)]
pub fn set_surface_objects(count: usize) {
    gauge!(SURFACE_OBJECTS).set(count as f64);
}
