//! 数据源 - 内联数据与远程请求的生命周期

mod request;
mod source;
mod state;
mod transport;

pub use request::FetchRequest;
pub use source::{DataSource, FetchContext};
pub use state::FetchState;
pub use transport::{parse_records, CompletionQueue, FetchCompletion, FetchJob, FetchTicket, Transport, UreqTransport};
