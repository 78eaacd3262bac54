//! Platform path capability: the `PathApi` trait, its shared-ownership
//! handle, and the process-wide flavor singletons.
//!
//! The rest of the crate consumes path algorithms exclusively through
//! [`PathApi`]; the two flavor implementations in this module are
//! collaborators behind that seam, not part of the binding core.

mod posix;
mod win32;

pub use posix::PosixPlatform;
pub use win32::Win32Platform;

use std::fmt;
use std::sync::{Arc, OnceLock};

/// The pieces of a path as produced by [`PathApi::parse`] and consumed by
/// [`PathApi::format`].
///
/// `root` is the anchor (`"/"`, `"C:\\"`, …), `dir` the full directory
/// portion including the root, `base` the final component, `ext` its
/// extension including the leading dot, and `name` the final component
/// without the extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPath {
    pub root: String,
    pub dir: String,
    pub base: String,
    pub ext: String,
    pub name: String,
}

/// Capability providing pure path-string algorithms and constants for one
/// platform flavor.
///
/// All operations are synchronous and side-effect free except [`resolve`],
/// which consults the process working directory when no absolute base is
/// present (matching the platform modules this trait abstracts).
///
/// [`resolve`]: PathApi::resolve
pub trait PathApi: fmt::Debug + Send + Sync + 'static {
    /// Path segment separator (`"/"` or `"\\"`).
    fn sep(&self) -> &'static str;

    /// Search-path list delimiter (`":"` or `";"`).
    fn delimiter(&self) -> &'static str;

    /// Join all segments with the separator and normalize the result.
    fn join(&self, parts: &[&str]) -> String;

    /// Collapse `.`/`..` segments and redundant separators.
    fn normalize(&self, path: &str) -> String;

    /// Resolve the segments right-to-left into an absolute path, falling
    /// back to the process working directory when none is absolute.
    fn resolve(&self, parts: &[&str]) -> String;

    /// The relative path from `from` to `to` (both resolved first).
    fn relative(&self, from: &str, to: &str) -> String;

    /// The directory portion of the path.
    fn dirname(&self, path: &str) -> String;

    /// The final component of the path.
    fn basename(&self, path: &str) -> String;

    /// The extension of the final component, including the leading dot.
    fn extname(&self, path: &str) -> String;

    /// Whether the path is absolute for this flavor.
    fn is_absolute(&self, path: &str) -> bool;

    /// Split the path into its [`ParsedPath`] pieces.
    fn parse(&self, path: &str) -> ParsedPath;

    /// Reassemble a path from [`ParsedPath`] pieces (inverse of `parse`).
    fn format(&self, parsed: &ParsedPath) -> String;

    /// The namespace-prefixed form of the path where the flavor has one
    /// (`\\?\` on Windows); the identity elsewhere.
    fn to_namespaced_path(&self, path: &str) -> String;

    /// The canonical POSIX-flavor handle.
    fn posix(&self) -> PlatformHandle;

    /// The canonical Windows-flavor handle.
    fn win32(&self) -> PlatformHandle;
}

/// Handle to a path platform implementation, enabling shared ownership.
///
/// Internally wraps `Arc<dyn PathApi>` for cheap cloning and thread-safe
/// sharing. Handle identity (the `Arc` allocation) is what the module cache
/// keys on, so implementations meant to share modules must share a handle;
/// the flavor singletons below do exactly that.
#[derive(Debug, Clone)]
pub struct PlatformHandle(Arc<dyn PathApi>);

impl PlatformHandle {
    /// Create a new PlatformHandle from a PathApi implementation.
    pub fn new(api: impl PathApi + 'static) -> Self {
        Self(Arc::new(api))
    }

    /// Returns true if both handles refer to the same implementation
    /// instance.
    pub fn ptr_eq(&self, other: &PlatformHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Opaque identity token used as a cache key.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl std::ops::Deref for PlatformHandle {
    type Target = dyn PathApi;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/// Collapse `.`/`..`/empty segments. In a rooted path `..` at the top is
/// dropped; in a relative path it is preserved.
pub(crate) fn collapse_dots<'a>(
    components: impl Iterator<Item = &'a str>,
    rooted: bool,
) -> Vec<&'a str> {
    let mut stack: Vec<&str> = Vec::new();
    for component in components {
        match component {
            "" | "." => {}
            ".." => {
                if let Some(last) = stack.last() {
                    if *last == ".." {
                        stack.push("..");
                    } else {
                        stack.pop();
                    }
                } else if !rooted {
                    stack.push("..");
                }
            }
            other => stack.push(other),
        }
    }
    stack
}

/// The process-wide POSIX-flavor platform handle.
pub fn posix() -> PlatformHandle {
    static CELL: OnceLock<PlatformHandle> = OnceLock::new();
    CELL.get_or_init(|| PlatformHandle::new(PosixPlatform)).clone()
}

/// The process-wide Windows-flavor platform handle.
pub fn win32() -> PlatformHandle {
    static CELL: OnceLock<PlatformHandle> = OnceLock::new();
    CELL.get_or_init(|| PlatformHandle::new(Win32Platform)).clone()
}

/// The host flavor. This is the same handle as [`posix`] on Unix hosts and
/// the same handle as [`win32`] on Windows hosts, so the native module and
/// its matching flavor module are one object.
pub fn native() -> PlatformHandle {
    if cfg!(windows) { win32() } else { posix() }
}
