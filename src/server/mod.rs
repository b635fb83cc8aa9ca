//! HTTP transport layer: request parsing, the dispatch service, and the
//! `may_minihttp` server wrapper.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_cookies, parse_query_params, parse_request, ParsedRequest};
pub use response::{SERVER_HEADER_NAME, SERVER_NAME};
pub use service::AppService;
