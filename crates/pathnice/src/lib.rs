//! Chainable, immutable path values over pluggable platform and filesystem
//! capabilities.
//!
//! A [`PathModule`] is the complete API surface for one (platform,
//! filesystem) capability pair: it constructs [`PathNice`] values, forwards
//! the platform's path algorithms unchanged, rebinds filesystems, and
//! exposes its `posix`/`win32` flavor siblings. Modules are cached
//! process-wide per pair, so repeated requests for the same pair return the
//! identical object and sibling cross-links converge instead of rebuilding.
//!
//! ```
//! # fn main() -> pathnice_base::PathNiceResult<()> {
//! let module = pathnice::posix();
//! let config = module.path(&["etc", "app", "config.json"])?;
//! assert_eq!(config.raw(), "etc/app/config.json");
//! assert_eq!(config.dirname().raw(), "etc/app");
//!
//! // The win32 sibling shares the filesystem binding and is cache-stable.
//! assert!(std::sync::Arc::ptr_eq(
//!     &module.win32(),
//!     &module.win32().posix().win32(),
//! ));
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod fs;
mod module;
mod nice;
pub mod ops;
pub mod platform;

pub use fs::{FileKind, FileStat, FsApi, FsHandle, MemFs, RealFs, default_fs};
pub use module::PathModule;
pub use nice::{PathNice, PathNiceArr};
pub use platform::{ParsedPath, PathApi, PlatformHandle, PosixPlatform, Win32Platform};

use std::sync::Arc;

use pathnice_base::PathNiceResult;

/// The module for the host platform flavor and the default filesystem.
pub fn native() -> Arc<PathModule> {
    PathModule::native()
}

/// The POSIX-flavor module over the default filesystem.
pub fn posix() -> Arc<PathModule> {
    PathModule::of(platform::posix(), fs::default_fs())
}

/// The Windows-flavor module over the default filesystem.
pub fn win32() -> Arc<PathModule> {
    PathModule::of(platform::win32(), fs::default_fs())
}

/// Construct a single path value on the native module.
/// See [`PathModule::path`].
pub fn path<S: AsRef<str>>(segments: &[S]) -> PathNiceResult<PathNice> {
    native().path(segments)
}

/// Construct a path value set on the native module.
/// See [`PathModule::paths`].
pub fn paths<S: AsRef<str>>(list: &[S]) -> PathNiceArr {
    native().paths(list)
}
