//! 基础设施层
//!
//! 持有唯一的稀缺资源（出站 HTTP 连接），只暴露"发送请求"的能力。

pub mod transport;

pub use transport::{ReqwestTransport, Transport, UpstreamRequest, UpstreamResponse};
