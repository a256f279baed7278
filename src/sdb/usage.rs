//! Box usage accounting
//!
//! Every response may report a `BoxUsage` figure. The client adds each one to
//! a shared accumulator, including figures carried by error responses.

use std::sync::Mutex;

/// Accumulated box usage for one client and the domains it hands out
#[derive(Debug, Default)]
pub struct Usage {
    box_usage: Mutex<f64>,
}

impl Usage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, value: f64) {
        *self.lock() += value;
    }

    /// Total usage since creation or the last reset
    pub fn box_usage(&self) -> f64 {
        *self.lock()
    }

    pub fn reset(&self) {
        *self.lock() = 0.0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, f64> {
        self.box_usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
