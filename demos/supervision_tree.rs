//! Two-level supervision tree whose lifecycle events bubble into a session bus.
//!
//! ```text
//! session-1 bus ◄── root bus ◄── team bus
//!                   root ──────── team ──── agent
//! ```
//!
//! `agent` crashes until `team` runs out of restarts. `team` then escalates
//! and `root` rebuilds it. A single listener on the session bus prints
//! every step, tagged with the bus it came from.
//!
//! Run with `cargo run --example supervision_tree`.

use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use agentvisor::{
    BusConfig, ChildSpec, EventBus, RestartPolicy, Supervisable, Supervisor, SupervisorConfig,
    WILDCARD, Worker, WorkerError, WorkerRef,
};

struct Agent;
impl Worker for Agent {}

type Slot = Arc<Mutex<Option<Arc<Supervisor>>>>;

/// Builds the nested `team` supervisor; rebuilds reuse the same bus node.
fn team_spec(
    root_bus: Arc<EventBus>,
    root: Arc<OnceLock<Weak<dyn Supervisable>>>,
    current: Slot,
) -> ChildSpec {
    ChildSpec::new("team", RestartPolicy::Permanent, move || {
        let root_bus = root_bus.clone();
        let parent = root.get().cloned();
        let current = current.clone();
        async move {
            let bus = match root_bus.child("team") {
                Some(bus) => bus,
                None => root_bus
                    .create_child("team")
                    .map_err(|e| WorkerError::factory(e.to_string()))?,
            };
            let cfg = SupervisorConfig::default().with_intensity(1, 60_000);
            let mut builder = Supervisor::builder("team", cfg)
                .with_bus(bus)
                .with_child(ChildSpec::new("agent", RestartPolicy::Permanent, || async {
                    Ok::<WorkerRef, WorkerError>(Arc::new(Agent))
                }));
            if let Some(parent) = parent {
                builder = builder.with_parent_weak(parent);
            }
            let team = builder.build();
            team.start()
                .await
                .map_err(|e| WorkerError::factory(e.to_string()))?;
            *current.lock().unwrap_or_else(PoisonError::into_inner) = Some(team.clone());
            Ok::<WorkerRef, WorkerError>(team)
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = EventBus::new("session-1", BusConfig::default());
    session.on(WILDCARD, |ev| {
        println!(
            "{:<22} from={:<5} supervisor={:<5} child={}",
            ev.event_type,
            ev.source().unwrap_or("-"),
            ev.field_str("supervisor").unwrap_or("-"),
            ev.field_str("child").unwrap_or("-"),
        );
    })?;

    let root_bus = session.create_child("root")?;
    let handle: Arc<OnceLock<Weak<dyn Supervisable>>> = Arc::new(OnceLock::new());
    let current: Slot = Arc::default();

    let root = Supervisor::builder("root", SupervisorConfig::default())
        .with_bus(root_bus.clone())
        .with_child(team_spec(root_bus, handle.clone(), current.clone()))
        .build();
    let weak: Weak<dyn Supervisable> = Arc::downgrade(&root) as Weak<dyn Supervisable>;
    let _ = handle.set(weak);

    root.start().await?;

    // The first crash is absorbed by `team`; the second exceeds its budget.
    for n in 1..=2 {
        let team = current.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(team) = team {
            team.handle_child_crash("agent", WorkerError::crashed(format!("crash #{n}")))
                .await;
        }
    }

    for (id, status) in root.children_status() {
        println!("root/{id}: {status:?}");
    }

    root.shutdown().await;
    Ok(())
}
