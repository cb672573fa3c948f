//! 配置值 - 字面量与 `$` 表达式的统一表示

use crate::widget::InstanceHandle;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// 表达式前缀
pub const EXPRESSION_PREFIX: char = '$';

/// 布局树中的配置值
///
/// 以 `$` 开头的字符串在反序列化时即被识别为表达式，
/// 其余值一律视为字面量。
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Expression(String),
    List(Vec<ConfigValue>),
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn is_expression(&self) -> bool {
        matches!(self, ConfigValue::Expression(_))
    }

    pub fn as_expression(&self) -> Option<&str> {
        match self {
            ConfigValue::Expression(source) => Some(source),
            _ => None,
        }
    }

    /// 转回 JSON，表达式保持原始字符串
    pub fn to_json(&self) -> JsonValue {
        match self {
            ConfigValue::Null => JsonValue::Null,
            ConfigValue::Bool(b) => JsonValue::Bool(*b),
            ConfigValue::Number(n) => JsonValue::Number(n.clone()),
            ConfigValue::String(s) | ConfigValue::Expression(s) => JsonValue::String(s.clone()),
            ConfigValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            ConfigValue::Map(entries) => JsonValue::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// 递归收集值中出现的所有表达式
    pub fn expressions(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.collect_expressions(&mut found);
        found
    }

    fn collect_expressions<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            ConfigValue::Expression(source) => found.push(source),
            ConfigValue::List(items) => {
                for item in items {
                    item.collect_expressions(found);
                }
            }
            ConfigValue::Map(entries) => {
                for value in entries.values() {
                    value.collect_expressions(found);
                }
            }
            _ => {}
        }
    }
}

impl From<JsonValue> for ConfigValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => ConfigValue::Null,
            JsonValue::Bool(b) => ConfigValue::Bool(b),
            JsonValue::Number(n) => ConfigValue::Number(n),
            JsonValue::String(s) if s.starts_with(EXPRESSION_PREFIX) => ConfigValue::Expression(s),
            JsonValue::String(s) => ConfigValue::String(s),
            JsonValue::Array(items) => ConfigValue::List(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(entries) => {
                ConfigValue::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::from(JsonValue::String(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// 解析后的值
#[derive(Clone)]
pub enum ResolvedValue {
    /// 解析失败（组件不存在、方法不可用或调用出错）
    Undefined,
    Value(JsonValue),
    /// `$id` 直接引用组件实例
    Instance(InstanceHandle),
}

impl ResolvedValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, ResolvedValue::Undefined)
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            ResolvedValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceHandle> {
        match self {
            ResolvedValue::Instance(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            ResolvedValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Undefined => write!(f, "Undefined"),
            ResolvedValue::Value(v) => write!(f, "Value({})", v),
            ResolvedValue::Instance(handle) => match handle.try_borrow() {
                Ok(widget) => write!(f, "Instance({})", widget.component()),
                Err(_) => write!(f, "Instance(<busy>)"),
            },
        }
    }
}

/// 事件处理函数收到的参数记录，保持声明顺序
pub type ResolvedArgs = IndexMap<String, ResolvedValue>;
