// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use prism_core::renderer::{Fence, FenceId};
use prism_core::utils::sync::lock;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A CPU-side fence signaled by a queue once submitted work has executed.
#[derive(Debug)]
pub struct SoftFence {
    id: FenceId,
    signaled: Mutex<bool>,
    changed: Condvar,
}

impl SoftFence {
    pub fn new() -> Self {
        Self {
            id: FenceId::generate(),
            signaled: Mutex::new(false),
            changed: Condvar::new(),
        }
    }
}

impl Default for SoftFence {
    fn default() -> Self {
        Self::new()
    }
}

impl Fence for SoftFence {
    fn id(&self) -> FenceId {
        self.id
    }

    fn signal(&self) {
        *lock(&self.signaled) = true;
        self.changed.notify_all();
    }

    fn is_signaled(&self) -> bool {
        *lock(&self.signaled)
    }

    fn reset(&self) {
        *lock(&self.signaled) = false;
    }

    fn wait(&self, timeout: Option<Duration>) -> bool {
        let mut signaled = lock(&self.signaled);
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        while !*signaled {
            signaled = match deadline {
                None => self
                    .changed
                    .wait(signaled)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    self.changed
                        .wait_timeout(signaled, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_signal_and_reset() {
        let fence = SoftFence::new();
        assert!(!fence.is_signaled());
        fence.signal();
        assert!(fence.is_signaled());
        assert!(fence.wait(Some(Duration::ZERO)));
        fence.reset();
        assert!(!fence.is_signaled());
    }

    #[test]
    fn test_wait_times_out() {
        let fence = SoftFence::new();
        assert!(!fence.wait(Some(Duration::from_millis(5))));
    }

    #[test]
    fn test_wait_wakes_on_signal() {
        let fence = Arc::new(SoftFence::new());
        let signaler = {
            let fence = Arc::clone(&fence);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                fence.signal();
            })
        };
        assert!(fence.wait(None));
        signaler.join().unwrap();
    }
}
