//! # relaykit
//!
//! A request-dispatch core for a small HTTP service framework, powered by
//! the `may` coroutine runtime and `may_minihttp`.
//!
//! relaykit matches incoming request paths against registered route
//! patterns, runs an ordered pipeline of handler units ("processes") with
//! per-process failure isolation, and notifies a publish/subscribe event
//! bus at defined lifecycle points.
//!
//! ## Architecture
//!
//! - **[`router`]** - route-pattern compilation and path matching with
//!   parameter extraction (`/users/:id`, trailing `*rest` catch-all)
//! - **[`route_data`]** - extracted parameters with typed fail-soft
//!   accessors
//! - **[`context`]** - per-request mutable state threaded by reference
//!   through the pipeline
//! - **[`process`]** - the `Processor` seam and the registration-order
//!   `ProcessTable`
//! - **[`event`]** - the wildcard-capable event bus instrumenting
//!   request and process lifecycle
//! - **[`dispatcher`]** - pipeline execution: every matching process
//!   runs, failures are recorded on the context, nothing short-circuits
//! - **[`server`]** - the `may_minihttp` transport: request parsing, the
//!   dispatch service with its outer isolation boundary, response writing
//! - **[`result`]** - the `HttpResult` rendering seam and common results
//! - **[`config`]** - TOML-backed server configuration
//!
//! ## Dispatch flow
//!
//! ```text
//! request → parse → HttpContext (path cleaned once, Server header set)
//!         → fire request-start
//!         → for each process in registration order:
//!               predicate match?
//!                 fire process-start → execute (isolated) → fire process-end
//!         → fire request-end
//!         → render ctx.result → response
//! ```
//!
//! A failure inside an executor lands on `ctx.error` and the pipeline
//! continues; a failure outside any executor is caught at the request
//! boundary and answered with a fixed 500 response.
//!
//! ## Example
//!
//! ```rust,no_run
//! use relaykit::{
//!     processor, route_processor, AppService, Dispatcher, EventBus, JsonResult,
//!     ProcessTable, WebConfig,
//! };
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     relaykit::logging::init();
//!
//!     let mut processes = ProcessTable::new();
//!     processes.register(
//!         "users",
//!         route_processor(&["/users/:id"], |ctx| {
//!             let id = ctx.route_value("id").unwrap_or("").to_string();
//!             ctx.result = Some(Box::new(JsonResult::ok(json!({ "id": id }))));
//!             Ok(())
//!         })?,
//!     )?;
//!
//!     let dispatcher = Dispatcher::new(processes, EventBus::new());
//!     let service = AppService::new(WebConfig::load_default(), dispatcher);
//!     let handle = service.start()?;
//!     handle.join().ok();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod event;
pub mod logging;
pub mod process;
pub mod result;
pub mod route_data;
pub mod router;
pub mod server;

pub use config::WebConfig;
pub use context::{clean_path, HttpContext};
pub use dispatcher::Dispatcher;
pub use event::{events, EventBus, EventContext, EventHandler, Subscriber, ANY};
pub use process::{processor, route_processor, FnProcessor, Process, ProcessTable, Processor, RouteProcessor};
pub use result::{ContentResult, ErrorResult, HttpResult, JsonResult, NotFoundResult};
pub use route_data::RouteData;
pub use router::{RoutePattern, RouteTable};
pub use server::{AppService, HttpServer, ServerHandle};
