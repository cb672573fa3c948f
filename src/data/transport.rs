//! 请求传输层
//!
//! 请求在后台线程执行，完成结果写入完成队列，
//! 由渲染器在主循环中取出并一次性应用到组件。

use super::request::FetchRequest;
use crate::error::FetchError;
use crate::options::RenderOptions;
use crate::registry::NodeKey;
use crate::widget::Records;
use log::debug;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

/// 请求票据：节点 + 该节点第几次请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub node: NodeKey,
    pub generation: u64,
}

/// 请求完成结果
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Records, FetchError>,
}

/// 完成队列
#[derive(Clone, Default)]
pub struct CompletionQueue {
    inner: Arc<Mutex<Vec<FetchCompletion>>>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, completion: FetchCompletion) {
        self.inner.lock().push(completion);
    }

    /// 获取并清空队列
    pub fn drain(&self) -> Vec<FetchCompletion> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// 一次待执行的请求
pub struct FetchJob {
    ticket: FetchTicket,
    request: FetchRequest,
    queue: CompletionQueue,
}

impl FetchJob {
    pub fn new(ticket: FetchTicket, request: FetchRequest, queue: CompletionQueue) -> Self {
        Self { ticket, request, queue }
    }

    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// 交付响应体（或错误），响应必须是记录数组
    pub fn complete(self, response: Result<JsonValue, FetchError>) {
        let result = response.and_then(|body| parse_records(&self.request.endpoint, body));
        self.queue.push(FetchCompletion { ticket: self.ticket, result });
    }
}

/// 传输层
pub trait Transport {
    fn submit(&self, job: FetchJob);
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn submit(&self, job: FetchJob) {
        (**self).submit(job)
    }
}

/// 基于 ureq 的 HTTP 传输
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(options: &RenderOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(options.fetch_timeout())
            .user_agent(&options.user_agent)
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn submit(&self, job: FetchJob) {
        let agent = self.agent.clone();
        debug!("fetch {} {}", job.request.method.as_str(), job.request.url());
        thread::spawn(move || {
            let response = execute(&agent, &job.request);
            job.complete(response);
        });
    }
}

fn execute(agent: &ureq::Agent, request: &FetchRequest) -> Result<JsonValue, FetchError> {
    let mut call = agent.request(request.method.as_str(), &request.endpoint);
    for (name, value) in &request.headers {
        call = call.set(name, value);
    }
    for (name, value) in &request.query {
        call = call.query(name, value);
    }

    let response = match &request.body {
        Some(body) => call.send_json(body),
        None => call.call(),
    };

    match response {
        Ok(response) => response.into_json::<JsonValue>().map_err(|err| FetchError::Malformed {
            endpoint: request.endpoint.clone(),
            message: err.to_string(),
        }),
        Err(ureq::Error::Status(status, _)) => Err(FetchError::Status {
            endpoint: request.endpoint.clone(),
            status,
        }),
        Err(err) => Err(FetchError::Transport {
            endpoint: request.endpoint.clone(),
            message: err.to_string(),
        }),
    }
}

/// 响应体必须是数组，否则视为失败
pub fn parse_records(endpoint: &str, body: JsonValue) -> Result<Records, FetchError> {
    match body {
        JsonValue::Array(records) => Ok(records),
        other => Err(FetchError::Malformed {
            endpoint: endpoint.to_string(),
            message: format!("expected an array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
