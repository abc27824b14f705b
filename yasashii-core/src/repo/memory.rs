use crate::CoreError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryRepo {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = self.values.read().keys().cloned().collect();
        v.sort();
        v
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CoreError> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CoreError> {
        self.values.write().clear();
        Ok(())
    }
}
