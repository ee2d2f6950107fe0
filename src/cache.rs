use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::ErrorCorrectionLevel;
use crate::encoder::{self, EncodedSymbol};
use crate::error::EncodeError;

/// Memoizes encoded symbols by `(payload, level)`.
///
/// Encoding is deterministic, so a hit is always equivalent to re-encoding.
/// When the cache reaches `capacity` it is cleared wholesale before the next
/// insert; this keeps memory bounded without tracking recency.
pub struct SymbolCache {
    capacity: usize,
    /// (payload, level) → symbol
    entries: Mutex<HashMap<(String, ErrorCorrectionLevel), Arc<EncodedSymbol>>>,
}

impl SymbolCache {
    pub fn new(capacity: usize) -> Self {
        SymbolCache {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached symbol or encode and remember it. Encoding errors are
    /// not cached.
    pub fn get_or_encode(
        &self,
        payload: &str,
        level: ErrorCorrectionLevel,
    ) -> Result<Arc<EncodedSymbol>, EncodeError> {
        let key = (payload.to_string(), level);
        if let Some(hit) = self.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        // Encode outside the lock; concurrent misses for the same key just
        // produce identical symbols.
        let symbol = Arc::new(encoder::encode(payload, level)?);

        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            log::debug!("symbol cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert(key, Arc::clone(&symbol));
        Ok(symbol)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, ErrorCorrectionLevel), Arc<EncodedSymbol>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
