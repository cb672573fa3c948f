//! 注册表 - 组件构造器与已挂载实例

mod component;
mod instance;

pub use component::{ComponentLookup, ComponentRegistry, Constructor};
pub use instance::{InstanceEntry, InstanceRegistry, NodeKey};
