//! 级联控制 - 父组件事件触发子组件重新加载

use crate::expr::ExpressionResolver;
use crate::registry::NodeKey;
use crate::schema::CascadeSpec;
use crate::value::ResolvedValue;
use log::debug;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// 父事件带来的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeAction {
    /// 以替换后的地址重新请求
    Fetch { node: NodeKey, endpoint: String },
    /// 父级没有选择，清空子节点数据
    Reset { node: NodeKey },
}

/// 级联控制器，每个子节点只保留一个订阅
#[derive(Default)]
pub struct CascadeController {
    subscriptions: BTreeMap<NodeKey, CascadeSpec>,
}

impl CascadeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅父事件，已有订阅时替换；返回是否发生替换
    pub fn subscribe(&mut self, dependent: NodeKey, spec: CascadeSpec) -> bool {
        self.subscriptions.insert(dependent, spec).is_some()
    }

    pub fn unsubscribe(&mut self, dependent: NodeKey) -> Option<CascadeSpec> {
        self.subscriptions.remove(&dependent)
    }

    pub fn subscription(&self, dependent: NodeKey) -> Option<&CascadeSpec> {
        self.subscriptions.get(&dependent)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// 订阅了 `parent_id` 的子节点（任意事件）
    pub fn dependents_of(&self, parent_id: &str) -> Vec<NodeKey> {
        self.subscriptions
            .iter()
            .filter(|(_, spec)| spec.parent_id == parent_id)
            .map(|(node, _)| *node)
            .collect()
    }

    /// 父组件 `parent_id` 触发了 `event_name`，按挂载顺序返回子节点的动作
    pub fn on_parent_event(
        &self,
        parent_id: &str,
        event_name: &str,
        payload: &JsonValue,
        resolver: &ExpressionResolver<'_>,
    ) -> Vec<CascadeAction> {
        self.subscriptions
            .iter()
            .filter(|(_, spec)| spec.parent_id == parent_id && spec.parent_event == event_name)
            .map(|(node, spec)| {
                let key = match read_key(payload, &spec.parent_key_field) {
                    KeyLookup::Found(value) => Some(value),
                    KeyLookup::Null => None,
                    KeyLookup::Missing => current_selection_key(spec, resolver),
                };
                match key {
                    Some(value) => {
                        let endpoint = substitute(&spec.endpoint_template, &spec.placeholder(), &value);
                        debug!("cascade {} -> {:?}: {}", parent_id, node, endpoint);
                        CascadeAction::Fetch { node: *node, endpoint }
                    }
                    None => {
                        debug!("cascade {} -> {:?}: no selection, clearing", parent_id, node);
                        CascadeAction::Reset { node: *node }
                    }
                }
            })
            .collect()
    }
}

enum KeyLookup {
    Found(JsonValue),
    /// 明确为空：字段为 null 或选择列表为空
    Null,
    Missing,
}

/// 从载荷读取键字段：对象直接读取，数组取第一个元素
fn read_key(payload: &JsonValue, field: &str) -> KeyLookup {
    let record = match payload {
        JsonValue::Array(items) => match items.first() {
            Some(first) => first,
            None => return KeyLookup::Null,
        },
        other => other,
    };
    match record.get(field) {
        Some(JsonValue::Null) => KeyLookup::Null,
        Some(value) => KeyLookup::Found(value.clone()),
        None => KeyLookup::Missing,
    }
}

/// 载荷中没有键字段时，读取父组件当前的选择
fn current_selection_key(spec: &CascadeSpec, resolver: &ExpressionResolver<'_>) -> Option<JsonValue> {
    match resolver.evaluate(&spec.selection_expression()) {
        ResolvedValue::Value(selection) => match read_key(&selection, &spec.parent_key_field) {
            KeyLookup::Found(value) => Some(value),
            KeyLookup::Null | KeyLookup::Missing => None,
        },
        _ => None,
    }
}

fn substitute(template: &str, placeholder: &str, value: &JsonValue) -> String {
    let text = match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    template.replace(placeholder, &urlencoding::encode(&text))
}
