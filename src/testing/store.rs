//! An in-memory [`PersistentStore`] for exercising cache persistence
//! round-trips without touching disk.

use crate::cache::PersistentStore;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for InMemoryStore {
    fn load(&self, key: &str) -> Option<HashMap<String, String>> {
        self.data.lock().unwrap().get(key).cloned()
    }

    fn save(&self, key: &str, snapshot: HashMap<String, String>) {
        self.data.lock().unwrap().insert(key.to_string(), snapshot);
    }
}
