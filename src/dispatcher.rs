//! Request pipeline execution.
//!
//! The dispatcher owns the immutable-during-serving process table and
//! event bus. For each request it fires the request-level lifecycle
//! events and runs **every** process whose predicate matches, in
//! registration order - there is no short-circuit on success and none on
//! error: a process that sets `ctx.error` does not stop later matching
//! processes from running.
//!
//! Each execution is bracketed by `process-start`/`process-end` events
//! and an isolation boundary: an `Err` return or a panic inside the
//! executor is converted into a recorded `ctx.error` and the pipeline
//! moves on. A second, outer boundary lives in the server service.

use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::anyhow;
use tracing::{debug, error};

use crate::context::HttpContext;
use crate::event::{events, EventBus};
use crate::process::{Process, ProcessTable};

/// Composes the process table and event bus into the per-request
/// pipeline. Built once at startup; read-only while serving.
#[derive(Default, Clone)]
pub struct Dispatcher {
    processes: ProcessTable,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(processes: ProcessTable, events: EventBus) -> Self {
        Self { processes, events }
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Run the full pipeline for one request.
    pub fn dispatch(&self, ctx: &mut HttpContext) {
        debug!(method = %ctx.method, path = %ctx.request_path, "request start");
        self.events.fire(
            events::SERVER_MODULE,
            events::REQUEST_START,
            events::SERVER_MODULE,
            None,
            ctx,
        );

        for process in self.processes.iter() {
            if process.handler.matches(ctx) {
                self.execute_process(process, ctx);
            }
        }

        self.events.fire(
            events::SERVER_MODULE,
            events::REQUEST_END,
            events::SERVER_MODULE,
            None,
            ctx,
        );
        debug!(
            method = %ctx.method,
            path = %ctx.request_path,
            error = ctx.error.is_some(),
            "request end"
        );
    }

    /// One process execution: start event, isolated executor run, end
    /// event. Failures land on `ctx.error`, nothing propagates.
    fn execute_process(&self, process: &Process, ctx: &mut HttpContext) {
        debug!(process = %process.name, "process start");
        self.events
            .fire(&process.name, events::PROCESS_START, &process.name, None, ctx);

        let outcome = catch_unwind(AssertUnwindSafe(|| process.handler.execute(ctx)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(process = %process.name, error = %err, "process failed");
                ctx.error = Some(err);
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                error!(process = %process.name, panic = %msg, "process panicked");
                ctx.error = Some(anyhow!("process {:?} panicked: {msg}", process.name));
            }
        }

        self.events
            .fire(&process.name, events::PROCESS_END, &process.name, None, ctx);
        debug!(process = %process.name, error = ctx.error.is_some(), "process end");
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
