//! Process-wide record of instrumented declaration chains.

use dashmap::DashMap;
use lazy_static::lazy_static;
use tracing::debug;

lazy_static! {
    // Keyed by qualified chain path and never torn down: entries are per
    // type, not per instance, so they accumulate for the process lifetime.
    static ref INSTRUMENTED: DashMap<String, bool> = DashMap::new();
}

/// Mark `chain_path` as instrumented, returning `true` on first
/// registration and `false` when the chain was already marked. The insert
/// is atomic, so the instrument-at-most-once invariant holds even when
/// schemas are first touched from concurrent test threads.
pub fn instrument(chain_path: &str) -> bool {
    let first = INSTRUMENTED.insert(chain_path.to_string(), true).is_none();
    if first {
        debug!(chain = chain_path, "chain instrumented");
    }
    first
}

pub fn is_instrumented(chain_path: &str) -> bool {
    INSTRUMENTED.contains_key(chain_path)
}
