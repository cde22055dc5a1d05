use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde_json::{Map, Value};

use super::{segments, DataStore, StoreError};

/// In-memory JSON tree standing in for the remote document store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    root: Arc<RwLock<Value>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(root: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(root)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seed the store from a JSON snapshot on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_value(root))
    }

    /// Write the whole tree to disk as pretty JSON.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let snapshot = self.snapshot()?;
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Value, StoreError> {
        let guard = self
            .root
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn next_key(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("k{:x}{:04x}", Utc::now().timestamp_millis(), seq & 0xffff)
    }

    fn with_root<T>(&self, f: impl FnOnce(&mut Value) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut guard = self
            .root
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

fn lookup<'a>(root: &'a Value, parts: &[&str]) -> Option<&'a Value> {
    parts
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(*segment))
}

fn ensure_node<'a>(root: &'a mut Value, parts: &[&str]) -> &'a mut Value {
    let mut node = root;
    for segment in parts {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map
                .entry((*segment).to_string())
                .or_insert(Value::Null),
            _ => unreachable!("node was just replaced with an object"),
        };
    }
    node
}

impl DataStore for MemoryStore {
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let parts = segments(path)?;
        let guard = self
            .root
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(lookup(&guard, &parts)
            .filter(|value| !value.is_null())
            .cloned())
    }

    fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let parts = segments(path)?;
        self.with_root(|root| {
            *ensure_node(root, &parts) = value;
            Ok(())
        })
    }

    fn update(&self, path: &str, partial: Value) -> Result<(), StoreError> {
        let parts = segments(path)?;
        let Value::Object(fields) = partial else {
            return Err(StoreError::Shape {
                path: path.to_string(),
                reason: "partial update must be an object".to_string(),
            });
        };

        self.with_root(|root| {
            let node = ensure_node(root, &parts);
            if node.is_null() {
                *node = Value::Object(Map::new());
            }
            match node {
                Value::Object(existing) => {
                    for (key, value) in fields {
                        existing.insert(key, value);
                    }
                    Ok(())
                }
                _ => Err(StoreError::Shape {
                    path: path.to_string(),
                    reason: "existing value is not an object".to_string(),
                }),
            }
        })
    }

    fn delete(&self, path: &str) -> Result<(), StoreError> {
        let parts = segments(path)?;
        let Some((last, parents)) = parts.split_last() else {
            return Err(StoreError::InvalidPath(path.to_string()));
        };

        self.with_root(|root| {
            let mut node = root;
            for segment in parents {
                match node.as_object_mut().and_then(|map| map.get_mut(*segment)) {
                    Some(child) => node = child,
                    None => return Ok(()),
                }
            }
            if let Some(map) = node.as_object_mut() {
                map.remove(*last);
            }
            Ok(())
        })
    }

    fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let parts = segments(path)?;
        let key = self.next_key();
        self.with_root(|root| {
            let parent = ensure_node(root, &parts);
            if !parent.is_object() {
                *parent = Value::Object(Map::new());
            }
            if let Value::Object(map) = parent {
                map.insert(key.clone(), value);
            }
            Ok(())
        })?;
        Ok(key)
    }
}
