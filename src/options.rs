//! 渲染选项

use indexmap::IndexMap;
use serde::Deserialize;
use std::time::Duration;

/// 渲染器配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// 相对 endpoint 的前缀
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// 每个请求都带上的请求头，可被数据源中的同名头覆盖
    #[serde(default)]
    pub default_headers: IndexMap<String, String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("mini-layout/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            default_headers: IndexMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl RenderOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// 超过 u64 毫秒上限时取 u64::MAX
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// 拼接 base_url；绝对地址保持不变
    pub fn resolve_endpoint(&self, endpoint: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(endpoint) => {
                format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
            }
            _ => endpoint.to_string(),
        }
    }
}

fn is_absolute(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://")
}
