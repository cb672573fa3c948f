//! 错误类型

use thiserror::Error;

/// 布局配置解析错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid layout json: {0}")]
    Json(#[from] serde_json::Error),
}

/// 构建期错误，整棵树拒绝挂载
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("duplicate component id '{0}'")]
    DuplicateId(String),

    #[error("cascade cycle through {}", .0.join(" -> "))]
    CascadeCycle(Vec<String>),
}

/// 表达式语法错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("expression must start with '$': {0}")]
    MissingPrefix(String),

    #[error("expected component id at {pos} in '{input}'")]
    MissingId { input: String, pos: usize },

    #[error("expected method name at {pos} in '{input}'")]
    MissingMethod { input: String, pos: usize },

    #[error("unexpected '{found}' at {pos} in '{input}'")]
    Unexpected { input: String, found: char, pos: usize },

    #[error("unterminated {what} in '{input}'")]
    Unterminated { input: String, what: &'static str },

    #[error("chained calls are not supported: '{0}'")]
    ChainedCall(String),

    #[error("nested expressions are not supported in arguments: '{0}'")]
    NestedExpression(String),
}

/// 远程数据请求错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("request to {endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("response from {endpoint} is not a list of records: {message}")]
    Malformed { endpoint: String, message: String },
}

/// 组件方法调用错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    #[error("method '{0}' is not supported")]
    UnknownMethod(String),

    #[error("bad arguments for '{method}': {message}")]
    BadArguments { method: String, message: String },

    #[error("{0}")]
    Failed(String),
}
