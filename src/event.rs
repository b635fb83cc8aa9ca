//! Synchronous publish/subscribe notification for pipeline lifecycle.
//!
//! Subscribers register a `(module, name)` filter, either side of which
//! may be the [`ANY`] wildcard. Firing an event walks the subscriber list
//! in registration order and delivers one lazily built [`EventContext`]
//! to every match; if nothing matches, no payload is allocated at all.
//!
//! The bus is built before serving starts and is read-only afterwards.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::context::HttpContext;

/// Wildcard matching any module or any event name.
pub const ANY: &str = "*";

/// Lifecycle event identifiers fired by the dispatcher.
pub mod events {
    /// Module of the request-level lifecycle events.
    pub const SERVER_MODULE: &str = "server";
    /// Fired once when a request enters the pipeline.
    pub const REQUEST_START: &str = "request-start";
    /// Fired once when a request leaves the pipeline.
    pub const REQUEST_END: &str = "request-end";
    /// Fired before each process execution, module = process name.
    pub const PROCESS_START: &str = "process-start";
    /// Fired after each process execution, module = process name.
    pub const PROCESS_END: &str = "process-end";
}

/// The ephemeral payload delivered to subscribers of one `fire` call.
/// Constructed at most once per call and shared, by reference, across all
/// matching handlers in order; context mutations made by one handler are
/// visible to the next.
pub struct EventContext<'a> {
    pub module: &'a str,
    pub name: &'a str,
    /// Tag naming the origin of the event (`"server"` or a process name).
    pub source: &'a str,
    /// Optional event payload.
    pub data: Option<&'a Value>,
    /// The active request context.
    pub ctx: &'a mut HttpContext,
}

/// Capability invoked for each matching subscription.
pub trait EventHandler: Send + Sync {
    fn on(&self, event: &mut EventContext<'_>);
}

impl<F> EventHandler for F
where
    F: Fn(&mut EventContext<'_>) + Send + Sync,
{
    fn on(&self, event: &mut EventContext<'_>) {
        self(event)
    }
}

/// One `(module, name, handler)` registration.
pub struct Subscriber {
    pub module: String,
    pub name: String,
    pub handler: Arc<dyn EventHandler>,
}

impl Subscriber {
    fn matches(&self, module: &str, name: &str) -> bool {
        (self.module == ANY || self.module == module) && (self.name == ANY || self.name == name)
    }
}

/// Ordered registry of event subscriptions.
#[derive(Default, Clone)]
pub struct EventBus {
    subscribers: Vec<Arc<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events matching `module`/`name`, either of
    /// which may be [`ANY`]. Registration order is delivery order.
    pub fn subscribe(&mut self, module: &str, name: &str, handler: Arc<dyn EventHandler>) {
        self.subscribers.push(Arc::new(Subscriber {
            module: module.to_string(),
            name: name.to_string(),
            handler,
        }));
    }

    /// Notify all matching subscribers. The payload is built only if at
    /// least one subscriber matches, and only once.
    pub fn fire(
        &self,
        module: &str,
        name: &str,
        source: &str,
        data: Option<&Value>,
        ctx: &mut HttpContext,
    ) {
        let matching: Vec<&Arc<Subscriber>> = self
            .subscribers
            .iter()
            .filter(|s| s.matches(module, name))
            .collect();
        if matching.is_empty() {
            return;
        }

        debug!(module = %module, name = %name, subscribers = matching.len(), "fire event");

        let mut event = EventContext {
            module,
            name,
            source,
            data,
            ctx,
        };
        for subscriber in matching {
            subscriber.handler.on(&mut event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(counter: Arc<AtomicUsize>) -> Arc<dyn EventHandler> {
        Arc::new(move |_e: &mut EventContext<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn exact_and_wildcard_matching() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        bus.subscribe("auth", "process-start", counting_handler(hits.clone()));
        bus.subscribe(ANY, "process-start", counting_handler(hits.clone()));
        bus.subscribe("auth", ANY, counting_handler(hits.clone()));
        bus.subscribe("render", "process-start", counting_handler(hits.clone()));

        let mut ctx = HttpContext::new(Method::GET, "/");
        bus.fire("auth", "process-start", "auth", None, &mut ctx);
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        bus.fire("render", "process-end", "render", None, &mut ctx);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn no_match_is_a_no_op() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        bus.subscribe("auth", "process-start", counting_handler(hits.clone()));
        let mut ctx = HttpContext::new(Method::GET, "/");
        bus.fire("other", "request-start", "server", None, &mut ctx);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handlers_run_in_registration_order_and_share_context() {
        let mut bus = EventBus::new();
        bus.subscribe(
            ANY,
            ANY,
            Arc::new(|e: &mut EventContext<'_>| {
                e.ctx.view_data.insert("trace".to_string(), json!(["first"]));
            }),
        );
        bus.subscribe(
            ANY,
            ANY,
            Arc::new(|e: &mut EventContext<'_>| {
                // mutation by the first handler is visible here
                if let Some(Value::Array(items)) = e.ctx.view_data.get_mut("trace") {
                    items.push(json!("second"));
                }
            }),
        );

        let mut ctx = HttpContext::new(Method::GET, "/");
        bus.fire("m", "n", "m", None, &mut ctx);
        assert_eq!(
            ctx.view_data.get("trace"),
            Some(&json!(["first", "second"]))
        );
    }

    #[test]
    fn payload_fields_are_shared_across_handlers() {
        let data = json!({"k": 1});
        let mut bus = EventBus::new();
        for _ in 0..2 {
            bus.subscribe(
                ANY,
                "request-start",
                Arc::new(|e: &mut EventContext<'_>| {
                    assert_eq!(e.module, "server");
                    assert_eq!(e.source, "server");
                    assert_eq!(e.data, Some(&serde_json::json!({"k": 1})));
                    e.ctx.set_flash("seen", serde_json::json!(true));
                }),
            );
        }
        let mut ctx = HttpContext::new(Method::GET, "/");
        bus.fire("server", "request-start", "server", Some(&data), &mut ctx);
        assert_eq!(ctx.flash("seen"), Some(&json!(true)));
    }
}
