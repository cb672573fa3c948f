//! 实例注册表 - 声明的 id 到已挂载组件实例的映射

use crate::error::RenderError;
use crate::widget::{CapabilitySet, InstanceHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NODE_KEY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 已挂载组件节点的唯一标识，进程内不会复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(pub u64);

impl NodeKey {
    pub fn next() -> Self {
        Self(NODE_KEY_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// 注册表条目
pub struct InstanceEntry {
    pub id: String,
    pub key: NodeKey,
    pub handle: InstanceHandle,
    pub capabilities: CapabilitySet,
}

/// 实例注册表
#[derive(Default)]
pub struct InstanceRegistry {
    entries: HashMap<String, InstanceEntry>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册实例，id 已存在时拒绝
    pub fn register(&mut self, id: &str, key: NodeKey, handle: InstanceHandle) -> Result<(), RenderError> {
        if self.entries.contains_key(id) {
            return Err(RenderError::DuplicateId(id.to_string()));
        }
        let capabilities = handle.borrow().capabilities();
        self.entries.insert(id.to_string(), InstanceEntry {
            id: id.to_string(),
            key,
            handle,
            capabilities,
        });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&InstanceEntry> {
        self.entries.get(id)
    }

    pub fn handle(&self, id: &str) -> Option<InstanceHandle> {
        self.entries.get(id).map(|entry| entry.handle.clone())
    }

    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.entries.get(id).map(|entry| entry.key)
    }

    pub fn remove(&mut self, id: &str) -> Option<InstanceEntry> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
