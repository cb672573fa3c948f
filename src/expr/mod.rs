//! `$id.method(args)` 表达式

mod parser;
mod resolver;

pub use parser::{Expression, MethodCall};
pub use resolver::ExpressionResolver;
