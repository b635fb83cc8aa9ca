//! The dispatch service: one `call` per request.
//!
//! `AppService` glues the transport to the core: it parses the raw
//! request, builds the context (path cleaned once, fixed `Server` header
//! set before any process runs), hands the context to the dispatcher,
//! renders the result, and writes the response. Any failure escaping the
//! pipeline - a panic outside an executor, or a result that fails to
//! render - is caught here, logged, and answered with the fixed
//! internal-error response instead of killing the serving loop.

use std::collections::HashMap;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use may_minihttp::{HttpService, Request, Response};
use serde_json::Value;
use tracing::{error, info};

use super::http_server::{HttpServer, ServerHandle};
use super::request::parse_request;
use super::response::{
    write_context_response, write_internal_error, SERVER_HEADER_NAME, SERVER_NAME,
};
use crate::config::WebConfig;
use crate::dispatcher::{panic_message, Dispatcher};
use crate::result::{HttpResult, NotFoundResult};

/// The per-connection HTTP service. Cheap to clone: all state is shared,
/// immutable snapshots built before serving starts.
#[derive(Clone)]
pub struct AppService {
    config: Arc<WebConfig>,
    dispatcher: Arc<Dispatcher>,
    variables: Arc<HashMap<String, Value>>,
}

impl AppService {
    /// Build the service. Runs every process's one-time `register` hook.
    pub fn new(config: WebConfig, dispatcher: Dispatcher) -> Self {
        for process in dispatcher.processes().iter() {
            process.handler.register(&config);
        }
        info!(
            address = %config.address,
            root_dir = %config.root_dir,
            config_dir = %config.config_dir,
            public_dir = %config.public_dir,
            processes = dispatcher.processes().len(),
            subscribers = dispatcher.events().len(),
            "http service configured"
        );
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            variables: Arc::new(HashMap::new()),
        }
    }

    /// Attach server-scoped variables readable via [`AppService::variable`].
    pub fn with_variables(mut self, variables: HashMap<String, Value>) -> Self {
        self.variables = Arc::new(variables);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Start serving on the configured address.
    pub fn start(self) -> io::Result<ServerHandle> {
        let address = self.config.address.clone();
        let max_headers = self.config.max_headers;
        info!(address = %address, max_headers, "http server is starting");
        HttpServer(self).start(address, max_headers)
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let mut ctx = parsed.into_context();
        ctx.set_header(SERVER_HEADER_NAME, SERVER_NAME);

        let dispatcher = &self.dispatcher;
        let outcome = catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<()> {
            dispatcher.dispatch(&mut ctx);
            if let Some(result) = ctx.result.take() {
                result.render(&mut ctx)?;
            } else if ctx.response_status().is_none() && ctx.response_body().is_empty() {
                // no process claimed the request
                NotFoundResult.render(&mut ctx)?;
            }
            Ok(())
        }));

        match outcome {
            Ok(Ok(())) => write_context_response(res, &ctx),
            Ok(Err(err)) => {
                error!(error = %err, "request failed outside process boundary");
                write_internal_error(res);
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                error!(panic = %msg, "request pipeline panicked");
                write_internal_error(res);
            }
        }
        Ok(())
    }
}
