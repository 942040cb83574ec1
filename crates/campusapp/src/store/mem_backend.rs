use super::backend::StorageBackend;
use crate::error::{CampusError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability; the client is single-threaded per
/// session, and `StorageBackend` methods all take `&self`.
#[derive(Default)]
pub struct MemBackend {
    documents: RefCell<HashMap<String, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    pub fn contains(&self, key: &str) -> bool {
        self.documents.borrow().contains_key(key)
    }
}

impl StorageBackend for MemBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(CampusError::Store("Simulated write error".to_string()));
        }
        self.documents
            .borrow_mut()
            .insert(key.to_string(), content.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(CampusError::Store("Simulated write error".to_string()));
        }
        self.documents.borrow_mut().remove(key);
        Ok(())
    }

    fn location(&self, key: &str) -> PathBuf {
        PathBuf::from(format!("mem://{}.json", key))
    }
}
