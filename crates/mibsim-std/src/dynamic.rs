//! Live values for entries with a dynamic function.

use mibsim_core::model::{DynamicFunction, Value};
use parking_lot::Mutex;
use std::time::Instant;

/// Clock and counter state backing dynamic entries.
///
/// Shared by reference across serving threads. The counter is the only
/// mutable state and sits behind a single mutex.
#[derive(Debug)]
pub struct LiveValues {
    started: Instant,
    counter: Mutex<u64>,
}

impl Default for LiveValues {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveValues {
    /// Start the clock now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            counter: Mutex::new(0),
        }
    }

    /// Hundredths of a second since start, wrapped to 32 bits like TimeTicks.
    #[must_use]
    pub fn uptime_ticks(&self) -> u32 {
        let centis = self.started.elapsed().as_millis() / 10;
        let wrapped = centis % (u128::from(u32::MAX) + 1);
        u32::try_from(wrapped).unwrap_or(u32::MAX)
    }

    /// Increment the counter and return the new value.
    pub fn next_counter(&self) -> u64 {
        let mut counter = self.counter.lock();
        *counter = counter.wrapping_add(1);
        *counter
    }

    /// Evaluate a dynamic function.
    pub fn evaluate(&self, function: DynamicFunction) -> Value {
        match function {
            DynamicFunction::Uptime => Value::from(i64::from(self.uptime_ticks())),
            DynamicFunction::Counter => Value::from(self.next_counter()),
        }
    }
}
