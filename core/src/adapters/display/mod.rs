//! Display topology adapters.

mod sysfs;
mod tracked;

pub use sysfs::{SysfsDisplayWatcher, SysfsDisplays, DEFAULT_DRM_ROOT};
pub use tracked::TrackedDisplays;
