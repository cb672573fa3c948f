//! 组件契约 - 外部组件库实现此接口后即可被布局树引用

use crate::error::WidgetError;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// 组件实例句柄
pub type InstanceHandle = Rc<RefCell<dyn Widget>>;

/// 组件构造时拿到的属性
pub type WidgetProps = JsonMap<String, JsonValue>;

/// 数据记录集合
pub type Records = Vec<JsonValue>;

/// 推送给组件 data 属性的内容
#[derive(Debug, Clone, PartialEq)]
pub enum DataPayload {
    Loading,
    Records(Records),
    /// 明确的“无数据”状态（请求失败或没有父级选择）
    NoData,
}

/// 允许通过表达式调用的方法白名单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    methods: BTreeSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: impl Into<String>) {
        self.methods.insert(method.into());
    }

    pub fn allows(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            methods: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// 组件 trait
pub trait Widget {
    /// 组件类型名（与注册表中的名字一致）
    fn component(&self) -> &str;

    /// 可被表达式调用的方法，构造完成后读取一次
    fn capabilities(&self) -> CapabilitySet;

    /// 调用方法。只会收到 `capabilities` 中声明过的名字
    fn invoke(&mut self, method: &str, args: &[JsonValue]) -> Result<JsonValue, WidgetError>;

    /// 更新组件数据
    fn set_data(&mut self, payload: DataPayload);
}
