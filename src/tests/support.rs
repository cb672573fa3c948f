//! 测试辅助：脚本化的模拟组件与手动完成的传输层

use crate::data::{FetchJob, FetchRequest, Transport};
use crate::error::WidgetError;
use crate::registry::ComponentRegistry;
use crate::widget::{CapabilitySet, DataPayload, InstanceHandle, Widget, WidgetProps};
use serde_json::{json, Value as JsonValue};
use std::cell::RefCell;
use std::rc::Rc;

/// 组件收到的数据推送记录：(label, payload)
pub type DataLog = Rc<RefCell<Vec<(String, DataPayload)>>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 模拟组件
///
/// - `getSelectedRowsData()` 返回 `props.selected`
/// - `selectRows(rows)` 替换选择
/// - `getValue()` 返回 `props.value`
/// - `explode()` 总是失败
/// - `secret()` 可调用但不在白名单里
pub struct MockWidget {
    component: String,
    label: String,
    props: WidgetProps,
    selected: Vec<JsonValue>,
    log: DataLog,
}

impl MockWidget {
    pub fn new(component: &str, props: &WidgetProps, log: DataLog) -> Self {
        let label = props
            .get("label")
            .and_then(JsonValue::as_str)
            .unwrap_or(component)
            .to_string();
        let selected = match props.get("selected") {
            Some(JsonValue::Array(rows)) => rows.clone(),
            _ => Vec::new(),
        };
        Self {
            component: component.to_string(),
            label,
            props: props.clone(),
            selected,
            log,
        }
    }

    pub fn handle(self) -> InstanceHandle {
        Rc::new(RefCell::new(self))
    }
}

impl Widget for MockWidget {
    fn component(&self) -> &str {
        &self.component
    }

    fn capabilities(&self) -> CapabilitySet {
        ["getSelectedRowsData", "selectRows", "getValue", "explode"].into_iter().collect()
    }

    fn invoke(&mut self, method: &str, args: &[JsonValue]) -> Result<JsonValue, WidgetError> {
        match method {
            "getSelectedRowsData" => Ok(JsonValue::Array(self.selected.clone())),
            "selectRows" => match args.first() {
                Some(JsonValue::Array(rows)) => {
                    self.selected = rows.clone();
                    Ok(JsonValue::Null)
                }
                _ => Err(WidgetError::BadArguments {
                    method: method.to_string(),
                    message: "expected an array of rows".to_string(),
                }),
            },
            "getValue" => Ok(self.props.get("value").cloned().unwrap_or(JsonValue::Null)),
            "explode" => Err(WidgetError::Failed("boom".to_string())),
            "secret" => Ok(json!("leaked")),
            other => Err(WidgetError::UnknownMethod(other.to_string())),
        }
    }

    fn set_data(&mut self, payload: DataPayload) {
        self.log.borrow_mut().push((self.label.clone(), payload));
    }
}

pub fn new_log() -> DataLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// 注册 Grid / Button / Form 三种模拟组件
pub fn mock_components(log: &DataLog) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for name in ["Grid", "Button", "Form"] {
        let log = log.clone();
        registry.register(name, move |props: &WidgetProps| MockWidget::new(name, props, log.clone()));
    }
    registry
}

/// 某个 label 最后收到的数据
pub fn last_payload(log: &DataLog, label: &str) -> Option<DataPayload> {
    log.borrow()
        .iter()
        .rev()
        .find(|(l, _)| l == label)
        .map(|(_, payload)| payload.clone())
}

/// 把请求攒起来，由测试决定何时以何种顺序完成
#[derive(Default)]
pub struct ManualTransport {
    jobs: RefCell<Vec<FetchJob>>,
    history: RefCell<Vec<FetchRequest>>,
}

impl ManualTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.jobs.borrow().len()
    }

    pub fn take_jobs(&self) -> Vec<FetchJob> {
        std::mem::take(&mut *self.jobs.borrow_mut())
    }

    /// 所有提交过的请求
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.history.borrow().clone()
    }
}

impl Transport for ManualTransport {
    fn submit(&self, job: FetchJob) {
        self.history.borrow_mut().push(job.request().clone());
        self.jobs.borrow_mut().push(job);
    }
}
