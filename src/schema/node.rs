//! 布局树节点定义
//!
//! 布局以 JSON 编写：
//!
//! ```json
//! {
//!   "type": "container",
//!   "layout": "grid",
//!   "gridTemplate": { "columns": "1fr 1fr", "gap": "20px" },
//!   "children": [
//!     { "type": "component", "component": "DxDataGrid", "id": "mainGrid",
//!       "props": { "keyExpr": "id" },
//!       "dataSource": { "endpoint": "https://api.example.com/users" } },
//!     { "type": "component", "component": "DxButton",
//!       "events": { "click": { "handler": "handleButtonClick",
//!                              "args": { "rows": "$mainGrid.getSelectedRowsData()" } } } }
//!   ]
//! }
//! ```

use super::data_spec::{CascadeSpec, DataSpec};
use crate::error::ConfigError;
use crate::value::ConfigValue;
use crate::widget::WidgetProps;
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// 样式表（原样交给 UI 层）
pub type StyleMap = IndexMap<String, JsonValue>;

/// 布局节点
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum LayoutNode {
    #[serde(rename = "container")]
    Container(ContainerNode),
    #[serde(rename = "component")]
    Widget(WidgetNode),
}

/// 容器方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
    Grid,
}

/// 网格模板
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GridTemplate {
    #[serde(default)]
    pub columns: Option<String>,
    #[serde(default)]
    pub rows: Option<String>,
    #[serde(default)]
    pub gap: Option<JsonValue>,
}

/// 容器节点
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerNode {
    #[serde(default, rename = "layout")]
    pub orientation: Orientation,
    #[serde(default)]
    pub grid_template: Option<GridTemplate>,
    #[serde(default)]
    pub children: Vec<LayoutNode>,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default, rename = "class", deserialize_with = "class_list")]
    pub classes: Vec<String>,
}

/// 组件节点
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetNode {
    pub component: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub props: IndexMap<String, ConfigValue>,
    #[serde(default)]
    pub events: IndexMap<String, EventBinding>,
    #[serde(default, alias = "dataSpec")]
    pub data_source: Option<DataSpec>,
    #[serde(default)]
    pub cascade: Option<CascadeSpec>,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default, rename = "class", deserialize_with = "class_list")]
    pub classes: Vec<String>,
}

/// 事件绑定
///
/// 支持简写 `"click": "handlerName"`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBinding")]
pub struct EventBinding {
    pub handler: String,
    pub args: IndexMap<String, ConfigValue>,
}

impl EventBinding {
    pub fn new(handler: &str) -> Self {
        Self { handler: handler.to_string(), args: IndexMap::new() }
    }

    pub fn with_arg(mut self, name: &str, value: impl Into<ConfigValue>) -> Self {
        self.args.insert(name.to_string(), value.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBinding {
    Name(String),
    Full {
        handler: String,
        #[serde(default)]
        args: IndexMap<String, ConfigValue>,
    },
}

impl From<RawBinding> for EventBinding {
    fn from(raw: RawBinding) -> Self {
        match raw {
            RawBinding::Name(handler) => Self { handler, args: IndexMap::new() },
            RawBinding::Full { handler, args } => Self { handler, args },
        }
    }
}

/// `class` 既可以是空格分隔的字符串，也可以是数组
fn class_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Classes {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Classes::deserialize(deserializer)? {
        Classes::Text(text) => text.split_whitespace().map(str::to_string).collect(),
        Classes::List(list) => list,
    })
}

impl LayoutNode {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let mut node: LayoutNode = serde_json::from_str(text)?;
        node.lift_prop_data_sources();
        Ok(node)
    }

    pub fn from_value(value: JsonValue) -> Result<Self, ConfigError> {
        let mut node: LayoutNode = serde_json::from_value(value)?;
        node.lift_prop_data_sources();
        Ok(node)
    }

    /// 前序遍历（父节点先于子节点，兄弟按声明顺序）
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a LayoutNode)) {
        visit(self);
        if let LayoutNode::Container(container) = self {
            for child in &container.children {
                child.walk(visit);
            }
        }
    }

    /// 文档顺序下的所有组件节点
    pub fn widgets(&self) -> Vec<&WidgetNode> {
        let mut widgets = Vec::new();
        self.walk(&mut |node| {
            if let LayoutNode::Widget(widget) = node {
                widgets.push(widget);
            }
        });
        widgets
    }

    /// 把 `props.dataSource` 提升为节点的数据源
    fn lift_prop_data_sources(&mut self) {
        match self {
            LayoutNode::Container(container) => {
                for child in &mut container.children {
                    child.lift_prop_data_sources();
                }
            }
            LayoutNode::Widget(widget) => widget.lift_prop_data_source(),
        }
    }
}

impl WidgetNode {
    pub fn new(component: &str) -> Self {
        Self { component: component.to_string(), ..Default::default() }
    }

    /// 构造组件时使用的属性
    pub fn props_json(&self) -> WidgetProps {
        self.props.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }

    fn lift_prop_data_source(&mut self) {
        if self.data_source.is_some() {
            return;
        }
        let Some(raw) = self.props.get("dataSource") else {
            return;
        };
        match serde_json::from_value::<DataSpec>(raw.to_json()) {
            Ok(spec) => {
                self.props.shift_remove("dataSource");
                self.data_source = Some(spec);
            }
            Err(err) => {
                warn!(
                    "component \"{}\": props.dataSource is not a data source ({}), passing it through as a prop",
                    self.component, err
                );
            }
        }
    }
}
