//! 表达式求值 - 基于实例注册表把表达式解析为具体值
//!
//! 任何失败（语法错误、组件不存在、方法不在白名单、调用出错）
//! 都只会得到 `ResolvedValue::Undefined` 并输出警告，不会向调用方返回错误。

use super::parser::Expression;
use crate::registry::InstanceRegistry;
use crate::value::{ConfigValue, ResolvedValue};
use log::warn;
use serde_json::{Map as JsonMap, Value as JsonValue};

/// 表达式求值器
pub struct ExpressionResolver<'a> {
    registry: &'a InstanceRegistry,
}

impl<'a> ExpressionResolver<'a> {
    pub fn new(registry: &'a InstanceRegistry) -> Self {
        Self { registry }
    }

    /// 解析单个配置值；非表达式原样返回
    pub fn resolve(&self, value: &ConfigValue) -> ResolvedValue {
        match value {
            ConfigValue::Expression(source) => self.evaluate(source),
            literal => ResolvedValue::Value(literal.to_json()),
        }
    }

    /// 递归解析结构中的每个表达式，结果必须能序列化
    ///
    /// 对象中解析失败的键被丢弃，数组中的则变为 null。
    pub fn resolve_deep(&self, value: &ConfigValue) -> Option<JsonValue> {
        match value {
            ConfigValue::Expression(source) => match self.evaluate(source) {
                ResolvedValue::Value(v) => Some(v),
                ResolvedValue::Instance(_) => {
                    warn!("expression \"{}\" resolves to a component instance, which cannot be sent", source);
                    None
                }
                ResolvedValue::Undefined => None,
            },
            ConfigValue::List(items) => Some(JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.resolve_deep(item).unwrap_or(JsonValue::Null))
                    .collect(),
            )),
            ConfigValue::Map(entries) => {
                let mut object = JsonMap::new();
                for (key, item) in entries {
                    if let Some(resolved) = self.resolve_deep(item) {
                        object.insert(key.clone(), resolved);
                    }
                }
                Some(JsonValue::Object(object))
            }
            literal => Some(literal.to_json()),
        }
    }

    /// 解析表达式字符串
    pub fn evaluate(&self, source: &str) -> ResolvedValue {
        match Expression::parse(source) {
            Ok(expression) => self.evaluate_parsed(&expression),
            Err(err) => {
                warn!("{}", err);
                ResolvedValue::Undefined
            }
        }
    }

    pub fn evaluate_parsed(&self, expression: &Expression) -> ResolvedValue {
        let Some(entry) = self.registry.get(&expression.target) else {
            warn!("expression \"{}\": component \"{}\" is not mounted", expression, expression.target);
            return ResolvedValue::Undefined;
        };

        let Some(call) = &expression.call else {
            return ResolvedValue::Instance(entry.handle.clone());
        };

        if !entry.capabilities.allows(&call.method) {
            warn!(
                "expression \"{}\": method \"{}\" is not available on \"{}\"",
                expression, call.method, expression.target
            );
            return ResolvedValue::Undefined;
        }

        let result = match entry.handle.try_borrow_mut() {
            Ok(mut widget) => widget.invoke(&call.method, &call.args),
            Err(_) => {
                warn!("expression \"{}\": component \"{}\" is busy", expression, expression.target);
                return ResolvedValue::Undefined;
            }
        };

        match result {
            Ok(value) => ResolvedValue::Value(value),
            Err(err) => {
                warn!("expression \"{}\" failed: {}", expression, err);
                ResolvedValue::Undefined
            }
        }
    }
}
