//! Optional process-wide cache instance
//!
//! Libraries and tests should take a [`ChanCache`] (or `Arc<ChanCache>`)
//! as a dependency. Applications that want a single shared instance call
//! [`init_global`] once at startup and [`global`] elsewhere.

use std::sync::Arc;

use chanstoredb::Result;
use once_cell::sync::OnceCell;

use crate::cache::ChanCache;
use crate::config::CacheConfig;

static GLOBAL: OnceCell<Arc<ChanCache>> = OnceCell::new();

/// Initialize the shared cache, or return it if already initialized
///
/// The configuration is ignored once an instance exists.
pub fn init_global(config: CacheConfig) -> Result<Arc<ChanCache>> {
    GLOBAL
        .get_or_try_init(|| ChanCache::new(config).map(Arc::new))
        .cloned()
}

/// The shared cache, if [`init_global`] has run
pub fn global() -> Option<Arc<ChanCache>> {
    GLOBAL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_once() {
        let first_dir = TempDir::new().unwrap();
        let second_dir = TempDir::new().unwrap();

        let first = init_global(CacheConfig::new(first_dir.path())).unwrap();
        let second = init_global(CacheConfig::new(second_dir.path())).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.config().root, first_dir.path());
        assert!(Arc::ptr_eq(&global().unwrap(), &first));
    }
}
