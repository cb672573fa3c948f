//! Mini Layout - 声明式布局解释器
//! 把 JSON 布局树渲染为组件实例树，支持 `$` 表达式、事件绑定、远程数据与父子级联

// 错误类型
pub mod error;

// 配置值与解析结果
pub mod value;

// 组件契约
pub mod widget;

// 组件注册表 / 实例注册表
pub mod registry;

// 布局树定义与校验
pub mod schema;

// 表达式解析与求值
pub mod expr;

// 事件系统
pub mod event;

// 数据源
pub mod data;

// 父子级联
pub mod cascade;

// 渲染选项
pub mod options;

// 布局渲染器
pub mod renderer;

pub use error::{ConfigError, ExpressionError, FetchError, RenderError, WidgetError};
pub use event::{HandlerTable, NativeEvent};
pub use options::RenderOptions;
pub use registry::{ComponentLookup, ComponentRegistry, InstanceRegistry, NodeKey};
pub use renderer::{LayoutRenderer, RenderedTree};
pub use schema::LayoutNode;
pub use value::{ConfigValue, ResolvedArgs, ResolvedValue};
pub use widget::{CapabilitySet, DataPayload, InstanceHandle, Widget};

// 单元测试
#[cfg(test)]
mod tests;
