// Copyright 2025 Content Filter Contributors
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

//! Object pool for reusable expression storage
//!
//! Compiled expressions are recycled through this pool to avoid
//! re-allocating their arenas and stores every time a subscriber updates
//! its filter expression.

use parking_lot::Mutex;

/// A simple lock-protected object pool.
pub struct ObjectPool<T> {
    items: Mutex<Vec<T>>,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Take an object from the pool, or create one with `make`.
    pub fn get(&self, make: impl FnOnce() -> T) -> T {
        self.items.lock().pop().unwrap_or_else(make)
    }

    /// Return an object to the pool.
    ///
    /// The caller is expected to have cleared it back to a reusable state.
    pub fn put(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Number of pooled objects.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true when the pool holds no objects.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_creates_when_empty() {
        let pool: ObjectPool<Vec<u8>> = ObjectPool::new();
        assert!(pool.is_empty());
        let item = pool.get(|| vec![1, 2, 3]);
        assert_eq!(item, vec![1, 2, 3]);
    }

    #[test]
    fn test_put_then_get_reuses() {
        let pool: ObjectPool<Vec<u8>> = ObjectPool::new();
        let mut item = Vec::with_capacity(64);
        item.push(7);
        item.clear();
        pool.put(item);
        assert_eq!(pool.len(), 1);

        let reused = pool.get(Vec::new);
        assert!(reused.is_empty());
        assert!(reused.capacity() >= 64);
        assert!(pool.is_empty());
    }
}
