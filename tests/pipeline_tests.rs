//! Tests for the process pipeline: ordering, multi-match execution, and
//! the per-process isolation boundary.

use std::sync::{Arc, Mutex};

use http::Method;
use relaykit::{
    processor, route_processor, Dispatcher, EventBus, HttpContext, ProcessTable,
};
use serde_json::json;

fn trace_processor(log: Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Arc<dyn relaykit::Processor> {
    processor(
        |_| true,
        move |_| {
            log.lock().unwrap().push(tag);
            Ok(())
        },
    )
}

#[test]
fn every_matching_process_runs_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut processes = ProcessTable::new();
    processes
        .register("first", trace_processor(log.clone(), "first"))
        .unwrap();
    processes
        .register(
            "skipped",
            processor(
                |ctx| ctx.request_path == "/elsewhere",
                |_| panic!("must not run"),
            ),
        )
        .unwrap();
    processes
        .register("second", trace_processor(log.clone(), "second"))
        .unwrap();

    let dispatcher = Dispatcher::new(processes, EventBus::new());
    let mut ctx = HttpContext::new(Method::GET, "/here");
    dispatcher.dispatch(&mut ctx);

    assert_eq!(*log.lock().unwrap(), ["first", "second"]);
    assert!(ctx.error.is_none());
}

#[test]
fn no_short_circuit_when_an_earlier_process_sets_error() {
    let ran_second = Arc::new(Mutex::new(false));
    let flag = ran_second.clone();

    let mut processes = ProcessTable::new();
    processes
        .register(
            "failing",
            processor(|_| true, |_| Err(anyhow::anyhow!("auth rejected"))),
        )
        .unwrap();
    processes
        .register(
            "after",
            processor(
                |_| true,
                move |ctx| {
                    // the error from the previous process is already recorded,
                    // and this process still runs
                    assert!(ctx.has_error());
                    *flag.lock().unwrap() = true;
                    Ok(())
                },
            ),
        )
        .unwrap();

    let dispatcher = Dispatcher::new(processes, EventBus::new());
    let mut ctx = HttpContext::new(Method::GET, "/anything");
    dispatcher.dispatch(&mut ctx);

    assert!(*ran_second.lock().unwrap());
    assert!(ctx.error.unwrap().to_string().contains("auth rejected"));
}

#[test]
fn panic_in_executor_is_recorded_and_pipeline_continues() {
    let ran_after = Arc::new(Mutex::new(false));
    let flag = ran_after.clone();

    let mut processes = ProcessTable::new();
    processes
        .register("bomb", processor(|_| true, |_| panic!("kaboom")))
        .unwrap();
    processes
        .register(
            "after",
            processor(
                |_| true,
                move |_| {
                    *flag.lock().unwrap() = true;
                    Ok(())
                },
            ),
        )
        .unwrap();

    let dispatcher = Dispatcher::new(processes, EventBus::new());
    let mut ctx = HttpContext::new(Method::GET, "/x");
    dispatcher.dispatch(&mut ctx);

    assert!(*ran_after.lock().unwrap());
    let err = ctx.error.unwrap().to_string();
    assert!(err.contains("bomb"));
    assert!(err.contains("kaboom"));
}

#[test]
fn err_return_is_recorded_on_context() {
    let mut processes = ProcessTable::new();
    processes
        .register(
            "failing",
            processor(|_| true, |_| Err(anyhow::anyhow!("db unavailable"))),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(processes, EventBus::new());
    let mut ctx = HttpContext::new(Method::GET, "/x");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(ctx.error.unwrap().to_string(), "db unavailable");
}

#[test]
fn route_process_copies_route_data_into_view_data() {
    let mut processes = ProcessTable::new();
    processes
        .register(
            "users",
            route_processor(&["/users/:id"], |ctx| {
                let id = ctx.route_value("id").unwrap_or("").to_string();
                ctx.view_data.insert("id".to_string(), json!(id));
                Ok(())
            })
            .unwrap(),
        )
        .unwrap();

    let dispatcher = Dispatcher::new(processes, EventBus::new());

    let mut ctx = HttpContext::new(Method::GET, "/users/42");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(ctx.view_data.get("id"), Some(&json!("42")));

    let mut miss = HttpContext::new(Method::GET, "/pets/42");
    dispatcher.dispatch(&mut miss);
    assert!(miss.view_data.is_empty());
}

#[test]
fn predicates_are_not_consulted_about_errors() {
    // a process whose predicate would reject errored requests still only
    // sees whatever it checks itself; the dispatcher never filters on
    // ctx.error
    let mut processes = ProcessTable::new();
    processes
        .register("fail", processor(|_| true, |_| Err(anyhow::anyhow!("x"))))
        .unwrap();
    let ran = Arc::new(Mutex::new(0));
    let counter = ran.clone();
    processes
        .register(
            "always",
            processor(
                |_| true,
                move |_| {
                    *counter.lock().unwrap() += 1;
                    Ok(())
                },
            ),
        )
        .unwrap();
    let dispatcher = Dispatcher::new(processes, EventBus::new());
    let mut ctx = HttpContext::new(Method::GET, "/x");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(*ran.lock().unwrap(), 1);
}
