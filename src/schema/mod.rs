//! 布局树配置

pub mod data_spec;
pub mod node;
mod validate;

pub use data_spec::{CascadeSpec, DataSpec, HttpMethod, RemoteSpec};
pub use node::{ContainerNode, EventBinding, GridTemplate, LayoutNode, Orientation, StyleMap, WidgetNode};
pub use validate::{validate, ConfigWarning};
