//! Admission-control pool partitioning
//!
//! Pools gate how many workers run and how fast they move bytes. The pool
//! implementation is an external collaborator; the coordinator's whole
//! discipline is choosing the right partition key, creating each pool
//! lazily on first use, and registering every worker exactly once.
//!
//! Downloads partition by (size class, destination) so small files are
//! not starved behind bulk transfers and each destination is throttled
//! independently. Uploads and hash-uploads share a single pool.

use std::collections::HashMap;
use std::sync::Arc;

use ferry_common::location::DestinationId;

use super::types::{Priority, UPLOAD_RATE_CEILING};
use super::worker::WorkerRef;

// =============================================================================
// Contract
// =============================================================================

/// Fairness mode a pool arbitrates under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FairnessMode {
    /// Favor maximal throughput
    Greedy,
    /// Favor an equitable baseline share for every registered worker
    Baseline,
}

/// Partition key selecting which pool admits a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKey {
    Download {
        small: bool,
        destination: DestinationId,
    },
    /// Shared by uploads and hash-uploads
    Upload,
}

/// The admission-control contract the coordinator requires
///
/// A pool is constructed with a byte-rate ceiling and a fairness mode and
/// arbitrates among the workers registered with it. Registration is
/// fire-and-forget; the pool talks to workers through their command
/// channel from then on.
pub trait AdmissionPool: Send + Sync {
    fn register_worker(&self, worker: WorkerRef, priority: Priority);
}

/// Constructor for pool instances
pub trait PoolFactory: Send {
    fn create(&self, rate_ceiling: u64, mode: FairnessMode) -> Arc<dyn AdmissionPool>;
}

// =============================================================================
// Keyed cache
// =============================================================================

/// Lazy keyed cache of pool instances, owned by the coordinator
///
/// Pools are created on first use of their key and retained for the
/// coordinator's entire lifetime. Retention is intentional: pools are
/// cheap, and the key space is bounded by two size classes times the
/// destinations actually in use, plus the one upload pool.
pub(crate) struct PoolSet {
    factory: Box<dyn PoolFactory>,
    /// Download ceiling with elevated-tier scaling already applied
    download_ceiling: u64,
    upload_mode: FairnessMode,
    pools: HashMap<PoolKey, Arc<dyn AdmissionPool>>,
}

impl PoolSet {
    pub fn new(factory: Box<dyn PoolFactory>, download_ceiling: u64, upload_mode: FairnessMode) -> Self {
        Self {
            factory,
            download_ceiling,
            upload_mode,
            pools: HashMap::new(),
        }
    }

    /// Look up the pool for a key, creating it on first use
    ///
    /// Idempotent: repeated calls with the same key return the same
    /// instance.
    pub fn get_or_create(&mut self, key: PoolKey) -> Arc<dyn AdmissionPool> {
        if let Some(pool) = self.pools.get(&key) {
            return Arc::clone(pool);
        }

        let pool = match key {
            PoolKey::Download { .. } => {
                self.factory.create(self.download_ceiling, FairnessMode::Baseline)
            }
            PoolKey::Upload => self.factory.create(UPLOAD_RATE_CEILING, self.upload_mode),
        };
        self.pools.insert(key, Arc::clone(&pool));
        pool
    }
}
