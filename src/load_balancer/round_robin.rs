//! Round-robin balancing policy.

use std::sync::Mutex;

use url::Url;

use crate::load_balancer::BalancePolicy;

/// Round-robin selector.
///
/// The cursor is an index modulo the length of whatever healthy set is
/// passed in; read and advance happen under one lock so concurrent
/// callers each observe a distinct, monotonically cycling index.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalancePolicy for RoundRobin {
    fn select_next(&self, healthy: &[Url]) -> Option<Url> {
        if healthy.is_empty() {
            return None;
        }

        let mut cursor = self.cursor.lock().expect("round robin cursor poisoned");
        let index = *cursor % healthy.len();
        *cursor = index + 1;
        Some(healthy[index].clone())
    }
}
