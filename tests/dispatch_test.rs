use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utsuri::{Dispatcher, EventKey, EventSpec, ListenerHandle, Value};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn evt() -> EventKey {
    EventKey::custom("evt")
}

#[test]
fn test_listeners_run_in_registration_order() {
    let dispatcher = Dispatcher::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let sink = log.clone();
        dispatcher.subscribe(evt(), move |_| sink.borrow_mut().push(label));
    }

    dispatcher.emit(&evt(), &[], &|_| true);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_args_reach_every_listener() {
    let dispatcher = Dispatcher::new();
    let seen: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    dispatcher.subscribe(evt(), move |args| {
        sink.borrow_mut().extend(args.iter().cloned())
    });

    dispatcher.emit(
        &evt(),
        &[Value::Integer(1), Value::String("two".to_string())],
        &|_| true,
    );
    assert_eq!(
        *seen.borrow(),
        vec![Value::Integer(1), Value::String("two".to_string())]
    );
}

#[test]
fn test_callback_can_unsubscribe_a_later_listener_mid_dispatch() {
    let dispatcher = Dispatcher::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let doomed: Rc<RefCell<Option<ListenerHandle>>> = Rc::new(RefCell::new(None));

    let sink = log.clone();
    let target = doomed.clone();
    dispatcher.subscribe(evt(), move |_| {
        sink.borrow_mut().push("a");
        if let Some(handle) = target.borrow().as_ref() {
            handle.unlisten();
        }
    });
    let sink = log.clone();
    dispatcher.subscribe(evt(), move |_| sink.borrow_mut().push("b"));
    let sink = log.clone();
    let handle = dispatcher.subscribe(evt(), move |_| sink.borrow_mut().push("c"));
    *doomed.borrow_mut() = Some(handle);

    dispatcher.emit(&evt(), &[], &|_| true);
    assert_eq!(*log.borrow(), vec!["a", "b"]);
    assert_eq!(dispatcher.subscribers(&evt()), 2);
}

#[test]
fn test_once_listener_removes_itself_mid_dispatch() {
    let dispatcher = Dispatcher::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = log.clone();
    dispatcher.subscribe_once(evt(), move |_| sink.borrow_mut().push("once"));
    let sink = log.clone();
    dispatcher.subscribe(evt(), move |_| sink.borrow_mut().push("keep"));

    dispatcher.emit(&evt(), &[], &|_| true);
    assert_eq!(*log.borrow(), vec!["once", "keep"]);

    dispatcher.emit(&evt(), &[], &|_| true);
    assert_eq!(*log.borrow(), vec!["once", "keep", "keep"]);
}

#[test]
fn test_listener_added_mid_dispatch_waits_for_the_next_one() {
    let dispatcher = Rc::new(Dispatcher::new());
    let added_fired = Rc::new(Cell::new(0usize));

    let inner_dispatcher = dispatcher.clone();
    let counter = added_fired.clone();
    dispatcher.subscribe(evt(), move |_| {
        let fired = counter.clone();
        inner_dispatcher.subscribe(evt(), move |_| fired.set(fired.get() + 1));
    });

    dispatcher.emit(&evt(), &[], &|_| true);
    assert_eq!(added_fired.get(), 0);
    assert_eq!(dispatcher.subscribers(&evt()), 2);

    dispatcher.emit(&evt(), &[], &|_| true);
    assert_eq!(added_fired.get(), 1);
}

#[test]
fn test_reentrant_emit_completes_before_returning() {
    let dispatcher = Rc::new(Dispatcher::new());
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let inner_dispatcher = dispatcher.clone();
    let sink = log.clone();
    dispatcher.subscribe(EventKey::custom("outer"), move |_| {
        sink.borrow_mut().push("outer");
        inner_dispatcher.emit(&EventKey::custom("inner"), &[], &|_| true);
    });
    let sink = log.clone();
    dispatcher.subscribe(EventKey::custom("inner"), move |_| {
        sink.borrow_mut().push("inner")
    });

    dispatcher.emit(&EventKey::custom("outer"), &[], &|_| true);
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
}

#[test]
fn test_guard_receives_the_declared_attribute_name() {
    let dispatcher = Dispatcher::new();
    let fired = Rc::new(Cell::new(0usize));
    let counter = fired.clone();
    let spec = EventSpec::on(evt()).when("ready");
    assert_eq!(spec.guard(), Some("ready"));
    dispatcher.subscribe(spec, move |_| counter.set(counter.get() + 1));

    dispatcher.emit(&evt(), &[], &|attribute| attribute == "ready");
    assert_eq!(fired.get(), 1);

    dispatcher.emit(&evt(), &[], &|attribute| attribute == "elsewhere");
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_handle_reports_its_key() {
    let dispatcher = Dispatcher::new();
    let handle = dispatcher.subscribe(EventKey::change_of("x"), |_| {});
    assert_eq!(handle.key(), &EventKey::change_of("x"));
}
