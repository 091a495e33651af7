//! Platform abstraction for time.
//!
//! Log timestamps need wall-clock time, which `std::time::SystemTime` does not provide
//! on `wasm32-unknown-unknown`.  Always import time through this module.

#[cfg(not(target_arch = "wasm32"))]
pub use std::time;

/// Browser-compatible time API backed by `Date.now()` and `performance.now()`.
#[cfg(target_arch = "wasm32")]
pub use web_time as time;
