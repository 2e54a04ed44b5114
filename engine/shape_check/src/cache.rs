//! Per-call-site validation cache.
//!
//! A successful validation of a container at a call site records the
//! container's fingerprint (identity plus mutation version). While the
//! fingerprint holds, re-checking the same site is a single map probe.
//! Only fully valid outcomes are recorded, and only for containers;
//! scalars are cheaper to re-check than to cache. Invalid outcomes are
//! never cached, so diagnostics stay fresh.
//!
//! The map is thread-local. Call-site ids are process-unique, so one
//! map per thread needs no locking and no cross-engine coordination;
//! a container validated on one thread simply re-validates once on
//! another.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use shape_ir::Fingerprint;

use crate::engine::CallSiteId;

thread_local! {
    static SITE_CACHE: RefCell<FxHashMap<CallSiteId, Fingerprint>> =
        RefCell::new(FxHashMap::default());
}

/// Whether the cached fingerprint for `site` matches `fingerprint`.
pub(crate) fn hit(site: CallSiteId, fingerprint: Fingerprint) -> bool {
    SITE_CACHE.with(|cache| cache.borrow().get(&site) == Some(&fingerprint))
}

/// Record a successful validation. Overwrites any stale fingerprint for
/// the site.
pub(crate) fn record(site: CallSiteId, fingerprint: Fingerprint) {
    SITE_CACHE.with(|cache| {
        cache.borrow_mut().insert(site, fingerprint);
    });
}

/// Drop the current thread's cache entries.
#[cfg(test)]
pub(crate) fn clear() {
    SITE_CACHE.with(|cache| cache.borrow_mut().clear());
}
