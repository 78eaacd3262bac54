//! Process-wide module cache.
//!
//! Modules are memoized per (platform, filesystem) capability pair, keyed
//! by handle identity. Repeated lookups with identical handles return the
//! pointer-identical module, which is what makes sibling cross-links
//! (`module.posix().win32()` and `module.win32()`) converge on stable
//! objects instead of rebuilding.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::fs::FsHandle;
use crate::module::PathModule;
use crate::platform::PlatformHandle;

type CacheMap = HashMap<usize, HashMap<usize, Arc<PathModule>>>;

static MODULES: OnceLock<Mutex<CacheMap>> = OnceLock::new();

/// Look up or build the module for the given capability pair.
///
/// Module construction performs no I/O and never re-enters the cache (the
/// sibling links are lazy), so the lock is held only across the in-memory
/// lookup-or-build. Entries live for the lifetime of the process; there is
/// no eviction and no teardown.
pub(crate) fn get(platform: &PlatformHandle, fs: &FsHandle) -> Arc<PathModule> {
    let mut modules = MODULES.get_or_init(|| Mutex::new(HashMap::new())).lock();
    modules
        .entry(platform.key())
        .or_default()
        .entry(fs.key())
        .or_insert_with(|| PathModule::build(platform.clone(), fs.clone()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use crate::platform;

    #[test]
    fn test_identical_pair_returns_identical_module() {
        let fs = FsHandle::new(MemFs::new());
        let first = get(&platform::posix(), &fs);
        let second = get(&platform::posix(), &fs);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_fs_yields_distinct_module() {
        let fs_a = FsHandle::new(MemFs::new());
        let fs_b = FsHandle::new(MemFs::new());
        let module_a = get(&platform::posix(), &fs_a);
        let module_b = get(&platform::posix(), &fs_b);
        assert!(!Arc::ptr_eq(&module_a, &module_b));
    }

    #[test]
    fn test_distinct_platform_yields_distinct_module() {
        let fs = FsHandle::new(MemFs::new());
        let module_posix = get(&platform::posix(), &fs);
        let module_win32 = get(&platform::win32(), &fs);
        assert!(!Arc::ptr_eq(&module_posix, &module_win32));
    }
}
