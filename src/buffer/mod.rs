// Per-kind delta buffers of pending, not yet published state

use parking_lot::Mutex;
use std::collections::HashMap;


/// Latest pending state per entity guid
///
/// Later inserts overwrite earlier ones for the same guid. A flush takes
/// the whole map under the lock with [`DeltaBuffer::drain`]; anything
/// inserted afterwards waits for the next window.
pub struct DeltaBuffer<T> {
    pending: Mutex<HashMap<String, T>>,
}

impl<T> DeltaBuffer<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Buffer `value` for `guid`, returning the buffer size afterwards
    pub fn insert(&self, guid: String, value: T) -> usize {
        let mut pending = self.pending.lock();
        pending.insert(guid, value);
        pending.len()
    }

    /// Take a snapshot of all pending entries, leaving the buffer empty.
    /// Entries are ordered by guid.
    pub fn drain(&self) -> Vec<(String, T)> {
        let taken = std::mem::take(&mut *self.pending.lock());
        let mut entries: Vec<(String, T)> = taken.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Carry entries that could not be rendered into the next window.
    ///
    /// A newer state buffered since the drain wins over the deferred one.
    pub fn defer(&self, entries: impl IntoIterator<Item = (String, T)>) {
        let mut pending = self.pending.lock();
        for (guid, value) in entries {
            pending.entry(guid).or_insert(value);
        }
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.pending.lock().contains_key(guid)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl<T> Default for DeltaBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
