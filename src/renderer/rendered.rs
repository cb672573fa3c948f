//! 渲染结果树

use crate::registry::NodeKey;
use crate::schema::{Orientation, StyleMap};
use crate::widget::InstanceHandle;
use std::fmt;

/// 渲染结果
#[derive(Debug, Default)]
pub struct RenderedTree {
    root: Option<RenderedNode>,
}

/// 渲染节点
#[derive(Debug)]
pub enum RenderedNode {
    Container(RenderedContainer),
    Widget(RenderedWidget),
}

/// 布局容器
#[derive(Debug)]
pub struct RenderedContainer {
    pub orientation: Orientation,
    pub layout: taffy::Style,
    pub style: StyleMap,
    pub classes: Vec<String>,
    pub children: Vec<RenderedNode>,
}

/// 已挂载的组件
pub struct RenderedWidget {
    pub key: NodeKey,
    pub id: Option<String>,
    pub component: String,
    pub instance: InstanceHandle,
    pub style: StyleMap,
    pub classes: Vec<String>,
}

impl fmt::Debug for RenderedWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedWidget")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("component", &self.component)
            .field("classes", &self.classes)
            .finish()
    }
}

impl RenderedTree {
    pub fn new(root: Option<RenderedNode>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<&RenderedNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// 文档顺序下的所有组件
    pub fn widgets(&self) -> Vec<&RenderedWidget> {
        let mut widgets = Vec::new();
        if let Some(root) = &self.root {
            collect_widgets(root, &mut widgets);
        }
        widgets
    }

    pub fn find_by_id(&self, id: &str) -> Option<&RenderedWidget> {
        self.widgets().into_iter().find(|w| w.id.as_deref() == Some(id))
    }

    pub fn find_by_key(&self, key: NodeKey) -> Option<&RenderedWidget> {
        self.widgets().into_iter().find(|w| w.key == key)
    }

    /// 移除一个组件节点，返回是否找到
    pub fn remove(&mut self, key: NodeKey) -> bool {
        if matches!(&self.root, Some(RenderedNode::Widget(widget)) if widget.key == key) {
            self.root = None;
            return true;
        }
        match &mut self.root {
            Some(node) => remove_from(node, key),
            None => false,
        }
    }
}

fn collect_widgets<'a>(node: &'a RenderedNode, out: &mut Vec<&'a RenderedWidget>) {
    match node {
        RenderedNode::Widget(widget) => out.push(widget),
        RenderedNode::Container(container) => {
            for child in &container.children {
                collect_widgets(child, out);
            }
        }
    }
}

fn remove_from(node: &mut RenderedNode, key: NodeKey) -> bool {
    let RenderedNode::Container(container) = node else {
        return false;
    };
    let before = container.children.len();
    container
        .children
        .retain(|child| !matches!(child, RenderedNode::Widget(widget) if widget.key == key));
    if container.children.len() != before {
        return true;
    }
    container.children.iter_mut().any(|child| remove_from(child, key))
}
