//! 事件系统 - 把组件事件派发给宿主提供的处理函数

use crate::expr::ExpressionResolver;
use crate::registry::{InstanceRegistry, NodeKey};
use crate::schema::EventBinding;
use crate::value::ResolvedArgs;
use log::{debug, warn};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// 组件触发的原生事件
#[derive(Debug, Clone)]
pub struct NativeEvent {
    pub name: String,
    pub source: NodeKey,
    pub source_id: Option<String>,
    pub payload: JsonValue,
}

/// 事件处理函数
pub type Handler = Box<dyn Fn(&NativeEvent, &ResolvedArgs)>;

/// 处理函数表，随每次渲染传入
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&NativeEvent, &ResolvedArgs) + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    pub fn with<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&NativeEvent, &ResolvedArgs) + 'static,
    {
        self.register(name, handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    bindings: HashMap<NodeKey, Vec<(String, EventBinding)>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定事件，同一节点同名事件只保留最后一次绑定
    pub fn bind(&mut self, node: NodeKey, event_name: &str, binding: EventBinding) {
        let list = self.bindings.entry(node).or_default();
        list.retain(|(name, _)| name != event_name);
        list.push((event_name.to_string(), binding));
    }

    pub fn binding(&self, node: NodeKey, event_name: &str) -> Option<&EventBinding> {
        self.bindings
            .get(&node)?
            .iter()
            .find(|(name, _)| name == event_name)
            .map(|(_, binding)| binding)
    }

    pub fn unbind_node(&mut self, node: NodeKey) {
        self.bindings.remove(&node);
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    /// 派发事件，返回是否调用了处理函数
    pub fn dispatch(&self, event: &NativeEvent, registry: &InstanceRegistry, handlers: &HandlerTable) -> bool {
        let Some(binding) = self.binding(event.source, &event.name) else {
            return false;
        };

        let Some(handler) = handlers.get(&binding.handler) else {
            warn!("event \"{}\": handler \"{}\" not found", event.name, binding.handler);
            return false;
        };

        // 参数先全部解析完（不持有任何组件借用）再调用处理函数
        let args = resolve_args(binding, &ExpressionResolver::new(registry));
        debug!("dispatching \"{}\" to \"{}\" with {} args", event.name, binding.handler, args.len());
        handler(event, &args);
        true
    }
}

/// 按声明顺序逐个独立解析参数
pub fn resolve_args(binding: &EventBinding, resolver: &ExpressionResolver<'_>) -> ResolvedArgs {
    binding
        .args
        .iter()
        .map(|(name, value)| (name.clone(), resolver.resolve(value)))
        .collect()
}
