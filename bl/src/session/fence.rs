//! LoadFence - generation stamps for asynchronous content loads

use tracing::debug;

/// Monotonic generation counter for content loads
///
/// Every load takes a new generation; a result is accepted only if its
/// generation is still the latest one handed out.
#[derive(Debug, Default)]
pub struct LoadFence {
    generation: u64,
}

impl LoadFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new load
    pub fn next(&mut self) -> u64 {
        self.generation += 1;
        debug!(generation = self.generation, "LoadFence::next: called");
        self.generation
    }

    /// Whether a completed load is still wanted
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Invalidate every load in flight without starting a new one
    pub fn invalidate(&mut self) {
        debug!("LoadFence::invalidate: called");
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
