//! 布局渲染器 - 遍历布局树、挂载组件并把数据源、级联、事件串起来

use super::container_style::container_style;
use super::rendered::{RenderedContainer, RenderedNode, RenderedTree, RenderedWidget};
use crate::cascade::{CascadeAction, CascadeController};
use crate::data::{CompletionQueue, DataSource, FetchContext, FetchState, Transport};
use crate::error::RenderError;
use crate::event::{EventDispatcher, HandlerTable, NativeEvent};
use crate::expr::ExpressionResolver;
use crate::options::RenderOptions;
use crate::registry::{ComponentLookup, InstanceRegistry, NodeKey};
use crate::schema::{validate, ContainerNode, LayoutNode, WidgetNode};
use log::{debug, info, warn};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 已挂载节点的基本信息
struct MountedWidget {
    id: Option<String>,
    component: String,
}

/// 布局渲染器
///
/// 所有操作都在调用线程上同步完成；只有远程请求在后台执行，
/// 其结果需要调用 [`LayoutRenderer::pump`] 才会应用到组件。
pub struct LayoutRenderer {
    components: Box<dyn ComponentLookup>,
    transport: Box<dyn Transport>,
    options: RenderOptions,
    registry: InstanceRegistry,
    handlers: HandlerTable,
    dispatcher: EventDispatcher,
    cascade: CascadeController,
    sources: BTreeMap<NodeKey, DataSource>,
    completions: CompletionQueue,
    mounted: HashMap<NodeKey, MountedWidget>,
    tree: RenderedTree,
}

impl LayoutRenderer {
    pub fn new(components: impl ComponentLookup + 'static, transport: impl Transport + 'static) -> Self {
        Self::with_options(components, transport, RenderOptions::default())
    }

    pub fn with_options(
        components: impl ComponentLookup + 'static,
        transport: impl Transport + 'static,
        options: RenderOptions,
    ) -> Self {
        Self {
            components: Box::new(components),
            transport: Box::new(transport),
            options,
            registry: InstanceRegistry::new(),
            handlers: HandlerTable::new(),
            dispatcher: EventDispatcher::new(),
            cascade: CascadeController::new(),
            sources: BTreeMap::new(),
            completions: CompletionQueue::new(),
            mounted: HashMap::new(),
            tree: RenderedTree::default(),
        }
    }

    /// 渲染布局树
    ///
    /// 校验失败（重复 id、级联成环）时整棵树拒绝挂载，当前已挂载的树保持不变。
    /// 校验通过后先卸载旧树再构建新树。
    pub fn render(&mut self, tree: &LayoutNode, handlers: HandlerTable) -> Result<&RenderedTree, RenderError> {
        let warnings = validate(tree)?;
        for warning in &warnings {
            warn!("{}", warning);
        }

        self.teardown();
        self.handlers = handlers;

        let root = self.mount_node(tree);
        self.tree = RenderedTree::new(root);

        info!(
            "rendered layout: {} widgets, {} registered ids, {} data sources",
            self.mounted.len(),
            self.registry.len(),
            self.sources.len()
        );
        Ok(&self.tree)
    }

    fn mount_node(&mut self, node: &LayoutNode) -> Option<RenderedNode> {
        match node {
            LayoutNode::Container(container) => Some(self.mount_container(container)),
            LayoutNode::Widget(widget) => self.mount_widget(widget),
        }
    }

    fn mount_container(&mut self, container: &ContainerNode) -> RenderedNode {
        let children = container
            .children
            .iter()
            .filter_map(|child| self.mount_node(child))
            .collect();

        RenderedNode::Container(RenderedContainer {
            orientation: container.orientation,
            layout: container_style(container),
            style: container.style.clone(),
            classes: container.classes.clone(),
            children,
        })
    }

    fn mount_widget(&mut self, widget: &WidgetNode) -> Option<RenderedNode> {
        let Some(constructor) = self.components.lookup(&widget.component) else {
            warn!("component \"{}\" not found in registry, skipping", widget.component);
            return None;
        };
        let instance = constructor(&widget.props_json());
        let key = NodeKey::next();

        if let Some(id) = &widget.id {
            if let Err(err) = self.registry.register(id, key, instance.clone()) {
                warn!("{}, skipping component \"{}\"", err, widget.component);
                return None;
            }
        }

        if widget.data_source.is_some() || widget.cascade.is_some() {
            let mut source = DataSource::new(
                key,
                &widget.component,
                widget.data_source.clone(),
                widget.cascade.is_some(),
                instance.clone(),
            );
            source.mount(&FetchContext {
                resolver: ExpressionResolver::new(&self.registry),
                transport: self.transport.as_ref(),
                queue: &self.completions,
                options: &self.options,
            });
            self.sources.insert(key, source);
        }

        if let Some(cascade) = &widget.cascade {
            self.cascade.subscribe(key, cascade.clone());
        }

        for (event_name, binding) in &widget.events {
            self.dispatcher.bind(key, event_name, binding.clone());
        }

        self.mounted.insert(key, MountedWidget {
            id: widget.id.clone(),
            component: widget.component.clone(),
        });
        debug!("mounted \"{}\" as {:?} (id: {:?})", widget.component, key, widget.id);

        Some(RenderedNode::Widget(RenderedWidget {
            key,
            id: widget.id.clone(),
            component: widget.component.clone(),
            instance,
            style: widget.style.clone(),
            classes: widget.classes.clone(),
        }))
    }

    /// 组件触发事件
    ///
    /// 先完成事件处理函数的参数解析与调用，再执行级联。
    /// 返回是否调用了处理函数。
    pub fn fire_event(&mut self, key: NodeKey, event_name: &str, payload: JsonValue) -> bool {
        let Some(mounted) = self.mounted.get(&key) else {
            warn!("event \"{}\" fired on a node that is not mounted ({:?})", event_name, key);
            return false;
        };
        let event = NativeEvent {
            name: event_name.to_string(),
            source: key,
            source_id: mounted.id.clone(),
            payload,
        };
        debug!("event \"{}\" from \"{}\"", event.name, mounted.component);

        let handled = self.dispatcher.dispatch(&event, &self.registry, &self.handlers);

        if let Some(parent_id) = &event.source_id {
            let actions = self.cascade.on_parent_event(
                parent_id,
                &event.name,
                &event.payload,
                &ExpressionResolver::new(&self.registry),
            );
            for action in actions {
                self.apply_cascade(action);
            }
        }
        handled
    }

    pub fn fire_event_by_id(&mut self, id: &str, event_name: &str, payload: JsonValue) -> bool {
        match self.registry.key_of(id) {
            Some(key) => self.fire_event(key, event_name, payload),
            None => {
                warn!("event \"{}\" fired on unknown id \"{}\"", event_name, id);
                false
            }
        }
    }

    fn apply_cascade(&mut self, action: CascadeAction) {
        let ctx = FetchContext {
            resolver: ExpressionResolver::new(&self.registry),
            transport: self.transport.as_ref(),
            queue: &self.completions,
            options: &self.options,
        };
        let node = match action {
            CascadeAction::Fetch { node, endpoint } => {
                if let Some(source) = self.sources.get_mut(&node) {
                    source.fetch(&endpoint, &ctx);
                }
                node
            }
            CascadeAction::Reset { node } => {
                if let Some(source) = self.sources.get_mut(&node) {
                    source.reset();
                }
                node
            }
        };
        self.reset_dependents(node);
    }

    /// `node` 的数据即将变化，清空以它为父级的整条级联链
    fn reset_dependents(&mut self, node: NodeKey) {
        let mut visited = HashSet::new();
        let mut pending = vec![node];
        while let Some(parent) = pending.pop() {
            if !visited.insert(parent) {
                continue;
            }
            let Some(parent_id) = self.mounted.get(&parent).and_then(|m| m.id.clone()) else {
                continue;
            };
            for dependent in self.cascade.dependents_of(&parent_id) {
                if let Some(source) = self.sources.get_mut(&dependent) {
                    debug!("cascade {} -> {:?}: parent data changed, clearing", parent_id, dependent);
                    source.reset();
                }
                pending.push(dependent);
            }
        }
    }

    /// 手动刷新 id 对应组件的数据
    pub fn refresh(&mut self, id: &str) -> bool {
        match self.registry.key_of(id) {
            Some(key) => self.refresh_key(key),
            None => {
                warn!("refresh: unknown id \"{}\"", id);
                false
            }
        }
    }

    /// 手动刷新节点数据，没有 id 的组件也可以使用
    pub fn refresh_key(&mut self, key: NodeKey) -> bool {
        let ctx = FetchContext {
            resolver: ExpressionResolver::new(&self.registry),
            transport: self.transport.as_ref(),
            queue: &self.completions,
            options: &self.options,
        };
        let refreshed = match self.sources.get_mut(&key) {
            Some(source) => source.refresh(&ctx),
            None => {
                warn!("refresh: {:?} has no data source", key);
                false
            }
        };
        if refreshed {
            self.reset_dependents(key);
        }
        refreshed
    }

    /// 应用已完成的请求，返回实际生效的数量
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        for completion in self.completions.drain() {
            match self.sources.get_mut(&completion.ticket.node) {
                Some(source) => {
                    if source.apply(completion) {
                        applied += 1;
                    }
                }
                None => debug!("dropping fetch result for unmounted node {:?}", completion.ticket.node),
            }
        }
        applied
    }

    /// 卸载单个组件
    pub fn unmount(&mut self, id: &str) -> bool {
        match self.registry.key_of(id) {
            Some(key) => self.unmount_key(key),
            None => false,
        }
    }

    /// 按节点键卸载，没有 id 的组件也可以使用
    pub fn unmount_key(&mut self, key: NodeKey) -> bool {
        let Some(widget) = self.mounted.get(&key) else {
            return false;
        };
        let id = widget.id.clone();
        if let Some(id) = &id {
            self.registry.remove(id);
        }
        self.detach(key);
        self.tree.remove(key);
        debug!("unmounted {:?} ({})", key, id.as_deref().unwrap_or("anonymous"));
        true
    }

    /// 卸载整棵树
    pub fn teardown(&mut self) {
        let keys: Vec<NodeKey> = self.mounted.keys().copied().collect();
        for key in keys {
            self.detach(key);
        }
        self.registry.clear();
        self.dispatcher.clear();
        self.cascade.clear();
        self.handlers = HandlerTable::new();
        self.tree = RenderedTree::default();
    }

    fn detach(&mut self, key: NodeKey) {
        if let Some(mut source) = self.sources.remove(&key) {
            source.cancel();
        }
        self.cascade.unsubscribe(key);
        self.dispatcher.unbind_node(key);
        self.mounted.remove(&key);
    }

    pub fn tree(&self) -> &RenderedTree {
        &self.tree
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn fetch_state(&self, id: &str) -> Option<&FetchState> {
        let key = self.registry.key_of(id)?;
        self.fetch_state_of(key)
    }

    pub fn fetch_state_of(&self, key: NodeKey) -> Option<&FetchState> {
        self.sources.get(&key).map(DataSource::state)
    }

    /// 等待应用的请求结果数量
    pub fn pending_completions(&self) -> usize {
        self.completions.len()
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }
}
