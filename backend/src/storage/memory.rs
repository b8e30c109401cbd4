use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::traits::KeyValueStorage;

/// HashMap-backed storage for embedding and tests.
///
/// `fail_writes` makes every subsequent `put_value` return an error while
/// leaving the stored values untouched; `failing_key` does the same for a
/// single key.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    failing_key: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_failing_key(&self, key: Option<&str>) {
        if let Ok(mut failing_key) = self.failing_key.lock() {
            *failing_key = key.map(str::to_string);
        }
    }

    fn write_blocked(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
            || self
                .failing_key
                .lock()
                .map(|failing_key| failing_key.as_deref() == Some(key))
                .unwrap_or(false)
    }

    /// Raw stored value, bypassing the failure switch
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        if self.write_blocked(key) {
            bail!("Simulated write failure for key {}", key);
        }

        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
