//! Named handler units and their registration-order table.
//!
//! A process combines a match predicate over the request context with an
//! executor that works by side effect on that context (commonly writing
//! `result`, `error`, or `view_data`). The [`ProcessTable`] is the ordered
//! sequence the dispatcher walks for every request; order is registration
//! order and is significant, since every matching process runs.

use std::sync::Arc;

use anyhow::bail;

use crate::config::WebConfig;
use crate::context::HttpContext;
use crate::router::RouteTable;

/// A unit of request handling: predicate plus executor.
///
/// `matches` receives a mutable context so predicates that consult a
/// route table can record extracted parameters as part of the check.
pub trait Processor: Send + Sync {
    /// Whether this process wants to run for the given request.
    fn matches(&self, ctx: &mut HttpContext) -> bool;

    /// Perform the work. An `Err` is recorded on `ctx.error` by the
    /// dispatcher; it never halts the remaining pipeline.
    fn execute(&self, ctx: &mut HttpContext) -> anyhow::Result<()>;

    /// One-time startup hook, called when the service is built.
    fn register(&self, _config: &WebConfig) {}
}

/// A named processor owned by the table.
pub struct Process {
    pub name: String,
    pub handler: Arc<dyn Processor>,
}

/// Registration-order sequence of all processes. Names are unique;
/// registration completes before serving begins.
#[derive(Default, Clone)]
pub struct ProcessTable {
    processes: Vec<Arc<Process>>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a process. Order of calls is execution priority.
    ///
    /// # Errors
    ///
    /// Fails if a process with the same name is already registered.
    pub fn register(&mut self, name: &str, handler: Arc<dyn Processor>) -> anyhow::Result<()> {
        if self.processes.iter().any(|p| p.name == name) {
            bail!("process already registered: {name:?}");
        }
        self.processes.push(Arc::new(Process {
            name: name.to_string(),
            handler,
        }));
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

/// Closure-backed processor, the quickest way to build a process.
pub struct FnProcessor<M, E> {
    matcher: M,
    executor: E,
}

impl<M, E> FnProcessor<M, E>
where
    M: Fn(&mut HttpContext) -> bool + Send + Sync,
    E: Fn(&mut HttpContext) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(matcher: M, executor: E) -> Self {
        Self { matcher, executor }
    }
}

impl<M, E> Processor for FnProcessor<M, E>
where
    M: Fn(&mut HttpContext) -> bool + Send + Sync,
    E: Fn(&mut HttpContext) -> anyhow::Result<()> + Send + Sync,
{
    fn matches(&self, ctx: &mut HttpContext) -> bool {
        (self.matcher)(ctx)
    }

    fn execute(&self, ctx: &mut HttpContext) -> anyhow::Result<()> {
        (self.executor)(ctx)
    }
}

/// Build an `Arc<dyn Processor>` from a predicate and an executor closure.
pub fn processor<M, E>(matcher: M, executor: E) -> Arc<dyn Processor>
where
    M: Fn(&mut HttpContext) -> bool + Send + Sync + 'static,
    E: Fn(&mut HttpContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(FnProcessor::new(matcher, executor))
}

/// A processor whose predicate consults a [`RouteTable`]: on a match it
/// stores the extracted [`crate::RouteData`] on the context and accepts the
/// request. Route matching stays a predicate here, not a dispatch stage -
/// later processes still get their own chance to match.
pub struct RouteProcessor<E> {
    table: RouteTable,
    executor: E,
}

impl<E> RouteProcessor<E>
where
    E: Fn(&mut HttpContext) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(table: RouteTable, executor: E) -> Self {
        Self { table, executor }
    }
}

impl<E> Processor for RouteProcessor<E>
where
    E: Fn(&mut HttpContext) -> anyhow::Result<()> + Send + Sync,
{
    fn matches(&self, ctx: &mut HttpContext) -> bool {
        match self.table.matches(&ctx.request_path) {
            Some(data) => {
                ctx.route_data = data;
                true
            }
            None => false,
        }
    }

    fn execute(&self, ctx: &mut HttpContext) -> anyhow::Result<()> {
        (self.executor)(ctx)
    }
}

/// Convenience: a route-table-backed process from pattern strings.
pub fn route_processor<E>(patterns: &[&str], executor: E) -> anyhow::Result<Arc<dyn Processor>>
where
    E: Fn(&mut HttpContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    let mut table = RouteTable::new();
    for p in patterns {
        table.register(p)?;
    }
    Ok(Arc::new(RouteProcessor::new(table, executor)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn duplicate_names_rejected() {
        let mut table = ProcessTable::new();
        table
            .register("auth", processor(|_| true, |_| Ok(())))
            .unwrap();
        let err = table
            .register("auth", processor(|_| true, |_| Ok(())))
            .unwrap_err();
        assert!(err.to_string().contains("auth"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut table = ProcessTable::new();
        for name in ["a", "b", "c"] {
            table.register(name, processor(|_| true, |_| Ok(()))).unwrap();
        }
        let names: Vec<&str> = table.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn route_processor_populates_route_data_on_match() {
        let p = route_processor(&["/users/:id"], |_| Ok(())).unwrap();
        let mut ctx = HttpContext::new(Method::GET, "/users/42");
        assert!(p.matches(&mut ctx));
        assert_eq!(ctx.route_data.get("id"), Some("42"));

        let mut miss = HttpContext::new(Method::GET, "/pets/42");
        assert!(!p.matches(&mut miss));
        assert!(miss.route_data.is_empty());
    }
}
