//! 表达式解析器
//!
//! 语法：`$<id>` 或 `$<id>.<method>(<字面量参数>)`。
//! 参数只能是数字、字符串、布尔、null 以及由它们组成的数组/对象；
//! 不支持链式调用和嵌套表达式。

use crate::error::ExpressionError;
use crate::value::EXPRESSION_PREFIX;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use std::fmt;

/// 解析后的表达式
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub target: String,
    pub call: Option<MethodCall>,
}

/// 方法调用部分
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<JsonValue>,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        ExpressionParser::new(source).parse()
    }

    /// 是否只是实例引用
    pub fn is_reference(&self) -> bool {
        self.call.is_none()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", EXPRESSION_PREFIX, self.target)?;
        if let Some(call) = &self.call {
            let args: Vec<String> = call.args.iter().map(JsonValue::to_string).collect();
            write!(f, ".{}({})", call.method, args.join(", "))?;
        }
        Ok(())
    }
}

struct ExpressionParser {
    source: String,
    input: Vec<char>,
    pos: usize,
}

impl ExpressionParser {
    fn new(source: &str) -> Self {
        let source = source.trim();
        Self {
            source: source.to_string(),
            input: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse(&mut self) -> Result<Expression, ExpressionError> {
        if self.current_char() != Some(EXPRESSION_PREFIX) {
            return Err(ExpressionError::MissingPrefix(self.source.clone()));
        }
        self.pos += 1;

        let target = self.parse_identifier(true);
        if target.is_empty() {
            return Err(ExpressionError::MissingId { input: self.source.clone(), pos: self.pos });
        }

        match self.current_char() {
            None => return Ok(Expression { target, call: None }),
            Some('.') => self.pos += 1,
            Some(c) => return Err(self.unexpected(c)),
        }

        let method = self.parse_identifier(false);
        if method.is_empty() {
            return Err(ExpressionError::MissingMethod { input: self.source.clone(), pos: self.pos });
        }

        self.skip_whitespace();
        match self.current_char() {
            Some('(') => self.pos += 1,
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.unterminated("argument list")),
        }
        let args = self.parse_args()?;

        self.skip_whitespace();
        match self.current_char() {
            None => Ok(Expression { target, call: Some(MethodCall { method, args }) }),
            Some('.') => Err(ExpressionError::ChainedCall(self.source.clone())),
            Some(c) => Err(self.unexpected(c)),
        }
    }

    /// 组件 id 允许 `-`，方法名不允许
    fn parse_identifier(&mut self, allow_dash: bool) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' || (allow_dash && c == '-') {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        ident
    }

    fn parse_args(&mut self) -> Result<Vec<JsonValue>, ExpressionError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.current_char() == Some(')') {
            self.pos += 1;
            return Ok(args);
        }

        loop {
            args.push(self.parse_literal()?);
            self.skip_whitespace();
            match self.current_char() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    return Ok(args);
                }
                Some(c) => return Err(self.unexpected(c)),
                None => return Err(self.unterminated("argument list")),
            }
        }
    }

    fn parse_literal(&mut self) -> Result<JsonValue, ExpressionError> {
        self.skip_whitespace();
        match self.current_char() {
            None => Err(self.unterminated("argument list")),
            Some(quote @ ('\'' | '"')) => self.parse_string(quote).map(JsonValue::String),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some(EXPRESSION_PREFIX) => Err(ExpressionError::NestedExpression(self.source.clone())),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '.' => self.parse_number(),
            Some(c) if c.is_alphabetic() => {
                let start = self.pos;
                let word = self.parse_identifier(false);
                match word.as_str() {
                    "true" => Ok(JsonValue::Bool(true)),
                    "false" => Ok(JsonValue::Bool(false)),
                    "null" | "undefined" => Ok(JsonValue::Null),
                    _ => {
                        self.pos = start;
                        Err(self.unexpected(c))
                    }
                }
            }
            Some(c) => Err(self.unexpected(c)),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ExpressionError> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.current_char() {
                None => return Err(self.unterminated("string")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(text);
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.current_char() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(c) => text.push(c),
                        None => return Err(self.unterminated("string")),
                    }
                    self.pos += 1;
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<JsonValue, ExpressionError> {
        let start = self.pos;
        let mut text = String::new();
        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        if let Ok(int) = text.parse::<i64>() {
            return Ok(JsonValue::Number(int.into()));
        }
        match text.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(number) => Ok(JsonValue::Number(number)),
            None => {
                self.pos = start;
                Err(self.unexpected(text.chars().next().unwrap_or('?')))
            }
        }
    }

    fn parse_array(&mut self) -> Result<JsonValue, ExpressionError> {
        self.pos += 1;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.current_char() == Some(']') {
            self.pos += 1;
            return Ok(JsonValue::Array(items));
        }

        loop {
            items.push(self.parse_literal()?);
            self.skip_whitespace();
            match self.current_char() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    return Ok(JsonValue::Array(items));
                }
                Some(c) => return Err(self.unexpected(c)),
                None => return Err(self.unterminated("array")),
            }
        }
    }

    fn parse_object(&mut self) -> Result<JsonValue, ExpressionError> {
        self.pos += 1;
        let mut entries = JsonMap::new();
        self.skip_whitespace();
        if self.current_char() == Some('}') {
            self.pos += 1;
            return Ok(JsonValue::Object(entries));
        }

        loop {
            self.skip_whitespace();
            let key = match self.current_char() {
                Some(quote @ ('\'' | '"')) => self.parse_string(quote)?,
                Some(c) if c.is_alphabetic() || c == '_' => self.parse_identifier(false),
                Some(c) => return Err(self.unexpected(c)),
                None => return Err(self.unterminated("object")),
            };

            self.skip_whitespace();
            match self.current_char() {
                Some(':') => self.pos += 1,
                Some(c) => return Err(self.unexpected(c)),
                None => return Err(self.unterminated("object")),
            }

            let value = self.parse_literal()?;
            entries.insert(key, value);

            self.skip_whitespace();
            match self.current_char() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    return Ok(JsonValue::Object(entries));
                }
                Some(c) => return Err(self.unexpected(c)),
                None => return Err(self.unterminated("object")),
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, found: char) -> ExpressionError {
        ExpressionError::Unexpected { input: self.source.clone(), found, pos: self.pos }
    }

    fn unterminated(&self, what: &'static str) -> ExpressionError {
        ExpressionError::Unterminated { input: self.source.clone(), what }
    }
}
