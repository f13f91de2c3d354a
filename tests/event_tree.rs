use std::sync::{Arc, Mutex};

use agentvisor::{
    BUBBLED_KEY, BusConfig, ChildSpec, Event, EventBus, EventKind, LogWriter, RestartPolicy,
    SOURCE_KEY, Subscribe, SubscriberSet, Supervisable, Supervisor, SupervisorConfig, VALUE_KEY,
    Worker, WorkerError, WorkerRef,
};
use serde_json::json;
use tracing_test::traced_test;

fn sink() -> (Arc<Mutex<Vec<Event>>>, impl Fn(&Event) + Send + Sync + 'static) {
    let seen: Arc<Mutex<Vec<Event>>> = Arc::default();
    let s = seen.clone();
    (seen, move |ev: &Event| s.lock().unwrap().push(ev.clone()))
}

#[test]
fn provenance_is_set_at_the_first_hop_and_kept_afterwards() {
    let root = EventBus::new("session-1", BusConfig::default());
    let team = root.create_child("team").unwrap();
    let agent = team.create_child("agent").unwrap();

    let (at_team, h) = sink();
    team.on("tick", h).unwrap();
    let (at_root, h) = sink();
    root.on("tick", h).unwrap();
    let (via_team, h) = sink();
    root.on_namespaced("team", h).unwrap();
    let (local, h) = sink();
    agent.on("tick", h).unwrap();

    let emitted = agent.emit("tick", json!({"n": 1}));

    let local = local.lock().unwrap();
    assert_eq!(local.len(), 1);
    assert!(!local[0].is_bubbled());

    for seen in [&at_team, &at_root, &via_team] {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].source(), Some("agent"));
        assert_eq!(seen[0].data["n"], 1);
        assert_eq!(seen[0].seq, emitted.seq);
        assert_eq!(&*seen[0].session_id, "session-1");
    }
}

#[test]
fn scalar_payloads_are_wrapped_when_bubbling() {
    let root = EventBus::new("s", BusConfig::default());
    let child = root.create_child("worker").unwrap();
    let (seen, h) = sink();
    root.on("progress", h).unwrap();

    child.emit("progress", json!(42));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].data[VALUE_KEY], 42);
    assert_eq!(seen[0].data[SOURCE_KEY], "worker");
    assert_eq!(seen[0].data[BUBBLED_KEY], true);
}

#[test]
fn broadcast_reaches_descendants_only() {
    let root = EventBus::new("s", BusConfig::default());
    let a = root.create_child("a").unwrap();
    let b = root.create_child("b").unwrap();
    let a1 = a.create_child("a1").unwrap();

    let (at_root, h) = sink();
    root.on("*", h).unwrap();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    for (bus, name) in [(&a, "a"), (&a1, "a1"), (&b, "b")] {
        let order = order.clone();
        bus.on("config", move |_| order.lock().unwrap().push(name)).unwrap();
    }

    root.broadcast("config", json!({"level": "debug"}));

    assert_eq!(*order.lock().unwrap(), vec!["a", "a1", "b"]);
    assert!(at_root.lock().unwrap().is_empty());
}

#[test]
fn namespaced_listeners_only_see_their_child() {
    let root = EventBus::new("s", BusConfig::default());
    let planner = root.create_child("planner").unwrap();
    let executor = root.create_child("executor").unwrap();
    let (seen, h) = sink();
    root.on_namespaced("planner", h).unwrap();

    planner.emit("a", json!({}));
    executor.emit("b", json!({}));
    root.emit("c", json!({}));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(&*seen[0].event_type, "a");
    assert_eq!(root.namespaces(), vec!["planner", "executor"]);
    assert!(root.child("executor").is_some());
}

struct Idle;
impl Worker for Idle {}

#[tokio::test]
async fn supervisor_lifecycle_bubbles_into_the_session_bus() {
    let session = EventBus::new("session-1", BusConfig::default());
    let sup = Supervisor::builder("team", SupervisorConfig::default())
        .with_bus(session.create_child("team").unwrap())
        .with_child(ChildSpec::new("agent", RestartPolicy::Permanent, || async {
            Ok::<WorkerRef, WorkerError>(Arc::new(Idle))
        }))
        .build();
    let (seen, h) = sink();
    session
        .on(EventKind::ChildRestarted.as_str(), h)
        .unwrap();

    sup.start().await.unwrap();
    sup.handle_child_crash("agent", WorkerError::crashed("boom")).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].source(), Some("team"));
    assert_eq!(seen[0].field_str("child"), Some("agent"));
    assert_eq!(seen[0].field_str("supervisor"), Some("team"));
}

#[tokio::test]
#[traced_test]
async fn subscribers_observe_the_whole_tree() {
    let session = EventBus::new("session-1", BusConfig::default());
    let set = SubscriberSet::attach(&session, vec![Arc::new(LogWriter::new()) as Arc<dyn Subscribe>])
        .unwrap();
    let sup = Supervisor::builder("team", SupervisorConfig::default())
        .with_bus(session.create_child("team").unwrap())
        .with_child(ChildSpec::new("agent", RestartPolicy::Permanent, || async {
            Ok::<WorkerRef, WorkerError>(Arc::new(Idle))
        }))
        .build();

    sup.start().await.unwrap();
    sup.handle_child_crash("agent", WorkerError::crashed("boom")).await;
    sup.shutdown().await;
    set.shutdown().await;

    assert!(logs_contain("supervisor started"));
    assert!(logs_contain("child restarted"));
    assert!(logs_contain("supervisor stopped"));
    assert_eq!(sup.id(), "team");
}
