//! 布局渲染器 - 把布局树渲染为组件实例树

mod container_style;
mod layout_renderer;
mod rendered;

pub use container_style::{container_style, parse_tracks};
pub use layout_renderer::LayoutRenderer;
pub use rendered::{RenderedContainer, RenderedNode, RenderedTree, RenderedWidget};
