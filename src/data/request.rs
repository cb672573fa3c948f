//! 请求构建

use crate::expr::ExpressionResolver;
use crate::options::RenderOptions;
use crate::schema::{HttpMethod, RemoteSpec};
use crate::value::ConfigValue;
use indexmap::IndexMap;
use log::warn;
use serde_json::Value as JsonValue;

/// 已解析完表达式、可直接发送的请求
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl FetchRequest {
    /// 用远程描述构建请求，`endpoint` 为实际地址（可能来自级联模板）
    pub fn build(spec: &RemoteSpec, endpoint: &str, resolver: &ExpressionResolver<'_>, options: &RenderOptions) -> Self {
        let mut headers: Vec<(String, String)> = options
            .default_headers
            .iter()
            .filter(|(name, _)| !spec.headers.keys().any(|own| own.eq_ignore_ascii_case(name)))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.extend(resolve_pairs(&spec.headers, resolver, "header"));

        let query = resolve_pairs(&spec.query_parameters, resolver, "query parameter");

        let body = spec.body.as_ref().and_then(|body| {
            let resolved = resolver.resolve_deep(body);
            if resolved.is_none() {
                warn!("request body for {} resolved to nothing, sending without body", endpoint);
            }
            resolved
        });

        Self {
            endpoint: options.resolve_endpoint(endpoint),
            method: spec.effective_method(),
            headers,
            query,
            body,
        }
    }

    /// 含查询串的完整地址
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.endpoint.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.endpoint, separator, query.join("&"))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn resolve_pairs(values: &IndexMap<String, ConfigValue>, resolver: &ExpressionResolver<'_>, what: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in values {
        match resolver.resolve_deep(value) {
            Some(JsonValue::Null) | None => {
                warn!("{} \"{}\" resolved to nothing, omitting it", what, name);
            }
            Some(resolved) => pairs.push((name.clone(), value_to_text(&resolved))),
        }
    }
    pairs
}

/// 字符串不带引号，其余按 JSON 文本
pub(crate) fn value_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
