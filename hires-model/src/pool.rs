//! Reusable tile models.

use std::sync::Mutex;

use crate::tile::TileModel;

/// Free list of tile models shared by render workers.
///
/// Models come back cleared but keep their grown capacity.
pub struct TileModelPool {
    free: Mutex<Vec<TileModel>>,
    initial_capacity: usize,
    max_pooled: usize,
}

impl TileModelPool {
    pub fn new(initial_capacity: usize, max_pooled: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            initial_capacity,
            max_pooled,
        }
    }

    pub fn acquire(&self) -> TileModel {
        self.free
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| TileModel::new(self.initial_capacity))
    }

    pub fn release(&self, mut model: TileModel) {
        model.clear();
        let mut free = self.free.lock().unwrap();
        if free.len() < self.max_pooled {
            free.push(model);
        }
    }

    /// Models currently waiting for reuse.
    pub fn available(&self) -> usize {
        self.free.lock().unwrap().len()
    }
}

impl Default for TileModelPool {
    fn default() -> Self {
        Self::new(1000, 64)
    }
}
