//! 单个节点的数据源

use super::request::FetchRequest;
use super::state::FetchState;
use super::transport::{CompletionQueue, FetchCompletion, FetchJob, FetchTicket, Transport};
use crate::expr::ExpressionResolver;
use crate::options::RenderOptions;
use crate::registry::NodeKey;
use crate::schema::{DataSpec, RemoteSpec};
use crate::widget::InstanceHandle;
use log::{debug, warn};

/// 发起请求所需的上下文
pub struct FetchContext<'a> {
    pub resolver: ExpressionResolver<'a>,
    pub transport: &'a dyn Transport,
    pub queue: &'a CompletionQueue,
    pub options: &'a RenderOptions,
}

/// 数据源
///
/// 每次触发请求都会递增 generation，只接受最新 generation 的完成结果。
pub struct DataSource {
    key: NodeKey,
    component: String,
    spec: Option<DataSpec>,
    cascaded: bool,
    widget: InstanceHandle,
    state: FetchState,
    generation: u64,
    last_endpoint: Option<String>,
}

impl DataSource {
    pub fn new(key: NodeKey, component: &str, spec: Option<DataSpec>, cascaded: bool, widget: InstanceHandle) -> Self {
        Self {
            key,
            component: component.to_string(),
            spec,
            cascaded,
            widget,
            state: FetchState::Idle,
            generation: 0,
            last_endpoint: None,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_endpoint(&self) -> Option<&str> {
        self.last_endpoint.as_deref()
    }

    /// 挂载时的初始加载
    ///
    /// 级联子节点在父节点给出选择之前不加载任何数据。
    pub fn mount(&mut self, ctx: &FetchContext<'_>) {
        if self.cascaded {
            self.set_state(FetchState::Idle);
            return;
        }
        match &self.spec {
            Some(DataSpec::Inline(records)) => {
                let records = records.clone();
                self.set_state(FetchState::Success(records));
            }
            Some(DataSpec::Remote(remote)) => {
                let endpoint = remote.endpoint.clone();
                self.fetch(&endpoint, ctx);
            }
            None => self.set_state(FetchState::Idle),
        }
    }

    /// 向 `endpoint` 发起新请求，之前未完成的请求结果将被丢弃
    pub fn fetch(&mut self, endpoint: &str, ctx: &FetchContext<'_>) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket { node: self.key, generation: self.generation };

        let request = match &self.spec {
            Some(DataSpec::Remote(remote)) => FetchRequest::build(remote, endpoint, &ctx.resolver, ctx.options),
            _ => FetchRequest::build(&RemoteSpec::new(endpoint), endpoint, &ctx.resolver, ctx.options),
        };

        debug!(
            "component \"{}\": fetch #{} {} {}",
            self.component, ticket.generation, request.method.as_str(), request.url()
        );
        self.last_endpoint = Some(endpoint.to_string());
        self.set_state(FetchState::Loading);
        ctx.transport.submit(FetchJob::new(ticket, request, ctx.queue.clone()));
        ticket
    }

    /// 手动刷新
    pub fn refresh(&mut self, ctx: &FetchContext<'_>) -> bool {
        if let Some(endpoint) = self.last_endpoint.clone() {
            self.fetch(&endpoint, ctx);
            return true;
        }
        if self.cascaded {
            warn!("component \"{}\": nothing to refresh before the parent selects a row", self.component);
            return false;
        }
        self.mount(ctx);
        true
    }

    /// 清空数据（父级没有选择时）并作废进行中的请求
    pub fn reset(&mut self) {
        self.generation += 1;
        self.last_endpoint = None;
        self.set_state(FetchState::Idle);
    }

    /// 卸载时调用，作废进行中的请求
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    /// 应用请求结果，过期的结果直接丢弃
    pub fn apply(&mut self, completion: FetchCompletion) -> bool {
        if completion.ticket.node != self.key || completion.ticket.generation != self.generation {
            debug!(
                "component \"{}\": discarding stale fetch #{} (current #{})",
                self.component, completion.ticket.generation, self.generation
            );
            return false;
        }
        match completion.result {
            Ok(records) => self.set_state(FetchState::Success(records)),
            Err(err) => {
                warn!("component \"{}\": {}", self.component, err);
                self.set_state(FetchState::Error(err));
            }
        }
        true
    }

    fn set_state(&mut self, state: FetchState) {
        let payload = state.payload();
        self.state = state;
        match self.widget.try_borrow_mut() {
            Ok(mut widget) => widget.set_data(payload),
            Err(_) => warn!("component \"{}\" is busy, data update dropped", self.component),
        }
    }
}
