//! 数据源与级联配置

use crate::value::{ConfigValue, EXPRESSION_PREFIX};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 组件数据来源
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DataSpec {
    /// 内联记录
    Inline(Vec<JsonValue>),
    /// 远程请求
    Remote(RemoteSpec),
}

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HttpMethod {
    #[serde(rename = "GET", alias = "get")]
    Get,
    #[serde(rename = "POST", alias = "post")]
    Post,
    #[serde(rename = "PUT", alias = "put")]
    Put,
    #[serde(rename = "PATCH", alias = "patch")]
    Patch,
    #[serde(rename = "DELETE", alias = "delete")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 远程数据描述
///
/// `headers`、`queryParameters`、`body` 中的字符串可以是表达式，
/// 在发起请求时按当前已挂载的实例求值。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSpec {
    #[serde(alias = "api", alias = "url")]
    pub endpoint: String,
    #[serde(default)]
    pub method: Option<HttpMethod>,
    #[serde(default)]
    pub headers: IndexMap<String, ConfigValue>,
    #[serde(default, alias = "params")]
    pub query_parameters: IndexMap<String, ConfigValue>,
    #[serde(default)]
    pub body: Option<ConfigValue>,
}

impl RemoteSpec {
    pub fn new(endpoint: &str) -> Self {
        Self { endpoint: endpoint.to_string(), ..Default::default() }
    }

    /// 未指定方法时：有 body 用 POST，否则 GET
    pub fn effective_method(&self) -> HttpMethod {
        match self.method {
            Some(method) => method,
            None if self.body.is_some() => HttpMethod::Post,
            None => HttpMethod::Get,
        }
    }

    /// 请求各部分中出现的表达式
    pub fn expressions(&self) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        for value in self.headers.values().chain(self.query_parameters.values()) {
            found.extend(value.expressions());
        }
        if let Some(body) = &self.body {
            found.extend(body.expressions());
        }
        found
    }
}

/// 父子级联
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSpec {
    #[serde(rename = "parentComponent", alias = "parentId")]
    pub parent_id: String,
    #[serde(rename = "parentEvent", alias = "parentEventName")]
    pub parent_event: String,
    pub endpoint_template: String,
    pub parent_key_field: String,
    /// 事件载荷缺少键字段时读取父组件当前选择的表达式
    #[serde(default)]
    pub selection: Option<String>,
}

impl CascadeSpec {
    /// `endpointTemplate` 中的占位符，例如 `{id}`
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.parent_key_field)
    }

    pub fn selection_expression(&self) -> String {
        match &self.selection {
            Some(expression) => expression.clone(),
            None => format!("{}{}.getSelectedRowsData()", EXPRESSION_PREFIX, self.parent_id),
        }
    }
}
