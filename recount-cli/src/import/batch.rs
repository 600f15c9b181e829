//! Size-bounded batch accumulation over the store's atomic write groups

use crate::store::{DocumentStore, DocumentWrite};

/// The store's maximum atomic-write-group size
pub const MAX_BATCH_SIZE: usize = 500;

/// One rejected write group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 1-based batch index within the entity pass
    pub batch: usize,
    /// Number of writes in the rejected group
    pub size: usize,
    pub reason: String,
}

/// Outcome of draining one accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Documents in groups the store accepted
    pub committed: usize,
    /// Write groups attempted
    pub batches: usize,
    /// Rejected groups, in commit order
    pub failures: Vec<BatchFailure>,
}

/// Buffers document writes and commits them in insertion order, one atomic
/// group per `capacity` writes plus a remainder group at the end.
///
/// A rejected group is recorded and the accumulator moves on to the next
/// one; a mid-pass store fault never aborts the pass.
pub struct BatchAccumulator<'a> {
    store: &'a dyn DocumentStore,
    collection: &'a str,
    label: &'a str,
    capacity: usize,
    buffer: Vec<DocumentWrite>,
    stats: BatchStats,
}

impl<'a> BatchAccumulator<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        collection: &'a str,
        label: &'a str,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            collection,
            label,
            capacity: capacity.clamp(1, MAX_BATCH_SIZE),
            buffer: Vec::new(),
            stats: BatchStats::default(),
        }
    }

    /// Append one write; commits the buffered group when it reaches capacity
    pub async fn push(&mut self, write: DocumentWrite) {
        self.buffer.push(write);
        if self.buffer.len() >= self.capacity {
            self.flush().await;
        }
    }

    /// Commit any buffered remainder and return the accumulated statistics
    pub async fn finish(mut self) -> BatchStats {
        if !self.buffer.is_empty() {
            self.flush().await;
        }
        self.stats
    }

    async fn flush(&mut self) {
        let writes = std::mem::take(&mut self.buffer);
        let size = writes.len();
        self.stats.batches += 1;
        let batch = self.stats.batches;

        match self.store.commit(self.collection, writes).await {
            Ok(()) => {
                self.stats.committed += size;
                log::debug!(
                    "{}: committed batch {} ({} documents)",
                    self.label,
                    batch,
                    size
                );
            }
            Err(err) => {
                log::warn!(
                    "{}: batch {} rejected ({} documents): {}",
                    self.label,
                    batch,
                    size,
                    err
                );
                self.stats.failures.push(BatchFailure {
                    batch,
                    size,
                    reason: err.to_string(),
                });
            }
        }
    }
}
