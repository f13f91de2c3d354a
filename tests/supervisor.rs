use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use agentvisor::{
    ChildSpec, ChildStatus, EventBus, EventKind, RestartPolicy, RestartStrategy, Supervisable,
    Supervisor, SupervisorConfig, SupervisorError, WILDCARD, Worker, WorkerError, WorkerRef,
};
use async_trait::async_trait;

struct Agent {
    hang: bool,
}

#[async_trait]
impl Worker for Agent {
    fn checks_liveness(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<(), WorkerError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

fn spec(id: &str, policy: RestartPolicy, starts: &Arc<AtomicUsize>) -> ChildSpec {
    let starts = starts.clone();
    ChildSpec::new(id.to_string(), policy, move || {
        starts.fetch_add(1, Ordering::SeqCst);
        async { Ok::<WorkerRef, WorkerError>(Arc::new(Agent { hang: false })) }
    })
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

type Log = Arc<Mutex<Vec<(String, String)>>>;

fn record(bus: &Arc<EventBus>) -> Log {
    let log: Log = Arc::default();
    let sink = log.clone();
    bus.on(WILDCARD, move |ev| {
        let child = ev.field_str("child").unwrap_or_default().to_string();
        sink.lock().unwrap().push((ev.event_type.to_string(), child));
    })
    .unwrap();
    log
}

fn ev(kind: EventKind, child: &str) -> (String, String) {
    (kind.as_str().to_string(), child.to_string())
}

fn count(log: &Log, kind: EventKind) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(t, _)| t == kind.as_str())
        .count()
}

#[derive(Default)]
struct MockParent {
    reports: Mutex<Vec<(String, WorkerError)>>,
}

#[async_trait]
impl Supervisable for MockParent {
    fn id(&self) -> &str {
        "mock"
    }

    async fn handle_child_crash(&self, child_id: &str, error: WorkerError) {
        self.reports.lock().unwrap().push((child_id.to_string(), error));
    }
}

#[tokio::test]
async fn children_start_in_declaration_order() {
    let n = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_children(["a", "b", "c"].map(|id| spec(id, RestartPolicy::Permanent, &n)))
        .build();
    let log = record(sup.bus());

    sup.start().await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ev(EventKind::SupervisorStart, ""),
            ev(EventKind::ChildStarted, "a"),
            ev(EventKind::ChildStarted, "b"),
            ev(EventKind::ChildStarted, "c"),
        ]
    );
    assert!(sup.children_status().iter().all(|(_, s)| *s == ChildStatus::Running));
    assert!(sup.live_node("b").is_some());
}

#[tokio::test]
async fn temporary_child_is_never_restarted() {
    let n = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(spec("tmp", RestartPolicy::Temporary, &n))
        .build();
    sup.start().await.unwrap();

    sup.handle_child_crash("tmp", WorkerError::crashed("boom")).await;

    assert_eq!(n.load(Ordering::SeqCst), 1);
    assert_eq!(sup.child_state("tmp").unwrap().status, ChildStatus::Stopped);
    assert!(sup.live_node("tmp").is_none());
}

#[tokio::test]
async fn transient_child_is_restarted_after_crash() {
    let n = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(spec("t", RestartPolicy::Transient, &n))
        .build();
    let log = record(sup.bus());
    sup.start().await.unwrap();

    sup.handle_child_crash("t", WorkerError::crashed("boom")).await;

    assert_eq!(n.load(Ordering::SeqCst), 2);
    let info = sup.child_state("t").unwrap();
    assert_eq!(info.status, ChildStatus::Running);
    assert_eq!(info.generation, 2);
    assert_eq!(info.restarts_in_window, 1);
    assert_eq!(count(&log, EventKind::ChildRestarted), 1);
}

#[tokio::test]
async fn reports_for_unknown_or_stopped_children_are_ignored() {
    let n = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(spec("a", RestartPolicy::Permanent, &n))
        .build();

    // Not started yet.
    sup.handle_child_crash("a", WorkerError::crashed("early")).await;
    sup.handle_child_crash("ghost", WorkerError::crashed("who")).await;
    assert_eq!(n.load(Ordering::SeqCst), 0);
    assert_eq!(sup.child_state("a").unwrap().status, ChildStatus::Stopped);
    assert!(sup.child_state("ghost").is_none());
}

#[tokio::test(start_paused = true)]
async fn intensity_is_exceeded_on_the_crash_after_max_restarts() {
    let n = counter();
    let fallbacks = counter();
    let fb = fallbacks.clone();
    let cfg = SupervisorConfig::default().with_intensity(2, 1_000);
    let sup = Supervisor::builder("root", cfg)
        .with_child(spec("a", RestartPolicy::Permanent, &n).with_degraded_fallback(move || {
            fb.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), WorkerError>(()) }
        }))
        .build();
    let log = record(sup.bus());
    sup.start().await.unwrap();

    sup.handle_child_crash("a", WorkerError::crashed("1")).await;
    sup.handle_child_crash("a", WorkerError::crashed("2")).await;
    assert_eq!(sup.child_state("a").unwrap().status, ChildStatus::Running);
    assert_eq!(count(&log, EventKind::IntensityExceeded), 0);

    sup.handle_child_crash("a", WorkerError::crashed("3")).await;

    assert_eq!(n.load(Ordering::SeqCst), 3);
    assert_eq!(count(&log, EventKind::IntensityExceeded), 1);
    assert_eq!(sup.child_state("a").unwrap().status, ChildStatus::Stopped);
    assert_eq!(fallbacks.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn restart_window_slides() {
    let n = counter();
    let cfg = SupervisorConfig::default().with_intensity(2, 1_000);
    let sup = Supervisor::builder("root", cfg)
        .with_child(spec("a", RestartPolicy::Permanent, &n))
        .build();
    let log = record(sup.bus());
    sup.start().await.unwrap();

    sup.handle_child_crash("a", WorkerError::crashed("1")).await;
    sup.handle_child_crash("a", WorkerError::crashed("2")).await;
    tokio::time::advance(Duration::from_millis(1_001)).await;
    sup.handle_child_crash("a", WorkerError::crashed("3")).await;

    assert_eq!(count(&log, EventKind::IntensityExceeded), 0);
    let info = sup.child_state("a").unwrap();
    assert_eq!(info.status, ChildStatus::Running);
    assert_eq!(info.restarts_in_window, 1);
    assert_eq!(n.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn one_for_all_stops_everything_then_restarts_in_order() {
    let n = counter();
    let cfg = SupervisorConfig::default().with_strategy(RestartStrategy::OneForAll);
    let sup = Supervisor::builder("root", cfg)
        .with_children(["a", "b", "c"].map(|id| spec(id, RestartPolicy::Permanent, &n)))
        .build();
    sup.start().await.unwrap();
    let log = record(sup.bus());

    sup.handle_child_crash("b", WorkerError::crashed("boom")).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ev(EventKind::ChildCrashed, "b"),
            ev(EventKind::ChildStopped, "a"),
            ev(EventKind::ChildStopped, "b"),
            ev(EventKind::ChildStopped, "c"),
            ev(EventKind::ChildRestarted, "a"),
            ev(EventKind::ChildRestarted, "b"),
            ev(EventKind::ChildRestarted, "c"),
        ]
    );
    assert_eq!(n.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn rest_for_one_leaves_earlier_siblings_alone() {
    let (a, b, c) = (counter(), counter(), counter());
    let cfg = SupervisorConfig::default().with_strategy(RestartStrategy::RestForOne);
    let sup = Supervisor::builder("root", cfg)
        .with_child(spec("a", RestartPolicy::Permanent, &a))
        .with_child(spec("b", RestartPolicy::Permanent, &b))
        .with_child(spec("c", RestartPolicy::Permanent, &c))
        .build();
    sup.start().await.unwrap();
    let before = sup.live_node("a").unwrap();
    let log = record(sup.bus());

    sup.handle_child_crash("b", WorkerError::crashed("boom")).await;

    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 2);
    assert_eq!(c.load(Ordering::SeqCst), 2);
    assert!(Arc::ptr_eq(&before, &sup.live_node("a").unwrap()));
    assert!(log.lock().unwrap().iter().all(|(_, child)| child != "a"));
}

#[tokio::test]
async fn sibling_restarts_skip_retired_temporary_children() {
    let (a, tmp) = (counter(), counter());
    let cfg = SupervisorConfig::default().with_strategy(RestartStrategy::OneForAll);
    let sup = Supervisor::builder("root", cfg)
        .with_child(spec("a", RestartPolicy::Permanent, &a))
        .with_child(spec("tmp", RestartPolicy::Temporary, &tmp))
        .build();
    sup.start().await.unwrap();

    sup.handle_child_crash("tmp", WorkerError::crashed("done")).await;
    sup.handle_child_crash("a", WorkerError::crashed("boom")).await;

    assert_eq!(tmp.load(Ordering::SeqCst), 1);
    assert_eq!(a.load(Ordering::SeqCst), 2);
    assert_eq!(sup.child_state("tmp").unwrap().status, ChildStatus::Stopped);
}

#[tokio::test]
async fn start_failure_is_reported_but_later_children_still_start() {
    let broken_calls = counter();
    let calls = broken_calls.clone();
    let ok = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(ChildSpec::new("broken", RestartPolicy::Permanent, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<WorkerRef, _>(WorkerError::factory("connection refused")) }
        }))
        .with_child(spec("ok", RestartPolicy::Permanent, &ok))
        .build();
    let log = record(sup.bus());

    let err = sup.start().await.unwrap_err();

    assert!(matches!(
        &err,
        SupervisorError::StartFailed { child, .. } if child == "broken"
    ));
    // One start plus three restarts before the budget runs out.
    assert_eq!(broken_calls.load(Ordering::SeqCst), 4);
    assert_eq!(count(&log, EventKind::IntensityExceeded), 1);
    assert_eq!(sup.child_state("broken").unwrap().status, ChildStatus::Stopped);
    assert_eq!(sup.child_state("ok").unwrap().status, ChildStatus::Running);
}

#[tokio::test]
async fn exhausted_child_escalates_to_parent_as_the_supervisor() {
    let n = counter();
    let fallbacks = counter();
    let fb = fallbacks.clone();
    let parent = Arc::new(MockParent::default());
    let inner = Supervisor::builder("inner", SupervisorConfig::default().with_intensity(1, 60_000))
        .with_child(spec("agent", RestartPolicy::Permanent, &n).with_degraded_fallback(move || {
            fb.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), WorkerError>(()) }
        }))
        .with_parent(&parent)
        .build();
    inner.start().await.unwrap();

    inner.handle_child_crash("agent", WorkerError::crashed("1")).await;
    inner.handle_child_crash("agent", WorkerError::crashed("2")).await;

    let reports = parent.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    let (child, error) = &reports[0];
    assert_eq!(child, "inner");
    assert!(matches!(error, WorkerError::Escalated { supervisor, .. } if supervisor == "inner"));
    assert_eq!(fallbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dropped_parent_falls_back_to_degraded_mode() {
    let n = counter();
    let fallbacks = counter();
    let fb = fallbacks.clone();
    let parent = Arc::new(MockParent::default());
    let inner = Supervisor::builder("inner", SupervisorConfig::default().with_intensity(0, 1_000))
        .with_child(spec("agent", RestartPolicy::Permanent, &n).with_degraded_fallback(move || {
            fb.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(WorkerError::crashed("fallback is best-effort")) }
        }))
        .with_parent(&parent)
        .build();
    drop(parent);
    inner.start().await.unwrap();

    inner.handle_child_crash("agent", WorkerError::crashed("boom")).await;

    assert_eq!(fallbacks.load(Ordering::SeqCst), 1);
    assert_eq!(inner.child_state("agent").unwrap().status, ChildStatus::Stopped);
}

#[tokio::test]
async fn escalation_restarts_the_nested_supervisor_in_a_real_tree() {
    let root_handle: Arc<OnceLock<Weak<dyn Supervisable>>> = Arc::new(OnceLock::new());
    let current_team: Arc<Mutex<Option<Arc<Supervisor>>>> = Arc::default();
    let team_builds = counter();
    let agents = counter();

    let (handle, current, builds) = (root_handle.clone(), current_team.clone(), team_builds.clone());
    let team = ChildSpec::new("team", RestartPolicy::Permanent, move || {
        builds.fetch_add(1, Ordering::SeqCst);
        let parent = handle.get().cloned();
        let current = current.clone();
        let agents = agents.clone();
        async move {
            let mut b = Supervisor::builder("team", SupervisorConfig::default().with_intensity(1, 60_000))
                .with_child(spec("agent", RestartPolicy::Permanent, &agents));
            if let Some(p) = parent {
                b = b.with_parent_weak(p);
            }
            let sup = b.build();
            sup.start()
                .await
                .map_err(|e| WorkerError::factory(e.to_string()))?;
            *current.lock().unwrap() = Some(sup.clone());
            Ok::<WorkerRef, WorkerError>(sup)
        }
    });

    let root = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(team)
        .build();
    let weak: Weak<dyn Supervisable> = Arc::downgrade(&root) as Weak<dyn Supervisable>;
    root_handle.set(weak).ok();
    let log = record(root.bus());
    root.start().await.unwrap();

    let first = current_team.lock().unwrap().clone().unwrap();
    first.handle_child_crash("agent", WorkerError::crashed("1")).await;
    first.handle_child_crash("agent", WorkerError::crashed("2")).await;

    assert_eq!(team_builds.load(Ordering::SeqCst), 2);
    assert_eq!(root.child_state("team").unwrap().generation, 2);
    let second = current_team.lock().unwrap().clone().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.child_state("agent").unwrap().status, ChildStatus::Running);
    assert_eq!(count(&log, EventKind::ChildCrashed), 1);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_timeout_is_treated_as_a_crash() {
    let builds = counter();
    let b = builds.clone();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(
            ChildSpec::new("slow", RestartPolicy::Permanent, move || {
                // Only the first instance stalls.
                let hang = b.fetch_add(1, Ordering::SeqCst) == 0;
                async move { Ok::<WorkerRef, WorkerError>(Arc::new(Agent { hang })) }
            })
            .with_heartbeat(Duration::from_millis(100), Some(Duration::from_millis(50))),
        )
        .build();
    let reasons: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = reasons.clone();
    sup.bus()
        .on(EventKind::ChildCrashed.as_str(), move |ev| {
            sink.lock()
                .unwrap()
                .push(ev.field_str("reason").unwrap_or_default().to_string());
        })
        .unwrap();

    sup.start().await.unwrap();
    assert_eq!(sup.active_heartbeats(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(*reasons.lock().unwrap(), vec!["worker_heartbeat_timeout"]);
    assert_eq!(sup.child_state("slow").unwrap().status, ChildStatus::Running);
    assert_eq!(sup.active_heartbeats(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_heartbeat_timers_survive_crashes_or_shutdown() {
    let (p, t) = (counter(), counter());
    let hb = |s: ChildSpec| s.with_heartbeat(Duration::from_millis(100), None);
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(hb(spec("p", RestartPolicy::Permanent, &p)))
        .with_child(hb(spec("t", RestartPolicy::Temporary, &t)))
        .build();
    sup.start().await.unwrap();
    assert_eq!(sup.active_heartbeats(), 2);

    sup.handle_child_crash("p", WorkerError::crashed("boom")).await;
    assert_eq!(sup.active_heartbeats(), 2);

    sup.handle_child_crash("t", WorkerError::crashed("boom")).await;
    assert_eq!(sup.active_heartbeats(), 1);

    sup.shutdown().await;
    assert_eq!(sup.active_heartbeats(), 0);
    assert!(!sup.child_state("p").unwrap().heartbeat_active);
}

#[tokio::test]
async fn shutdown_stops_children_in_reverse_order() {
    let n = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_children(["a", "b", "c"].map(|id| spec(id, RestartPolicy::Permanent, &n)))
        .build();
    sup.start().await.unwrap();
    let log = record(sup.bus());

    sup.shutdown().await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ev(EventKind::ChildStopped, "c"),
            ev(EventKind::ChildStopped, "b"),
            ev(EventKind::ChildStopped, "a"),
            ev(EventKind::SupervisorStop, ""),
        ]
    );
    assert!(sup.children_status().iter().all(|(_, s)| *s == ChildStatus::Stopped));

    // Crash reports after shutdown are no-ops.
    sup.handle_child_crash("a", WorkerError::crashed("late")).await;
    assert_eq!(n.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn supervisor_can_be_restarted_after_shutdown() {
    let n = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(spec("a", RestartPolicy::Permanent, &n))
        .build();
    sup.start().await.unwrap();
    sup.shutdown().await;
    sup.start().await.unwrap();

    assert_eq!(sup.child_state("a").unwrap().status, ChildStatus::Running);
    sup.handle_child_crash("a", WorkerError::crashed("boom")).await;
    assert_eq!(n.load(Ordering::SeqCst), 3);
}

/// Rejects its liveness check while `reject` is set.
struct Flaky {
    reject: bool,
}

#[async_trait]
impl Worker for Flaky {
    fn checks_liveness(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<(), WorkerError> {
        if self.reject {
            return Err(WorkerError::crashed("queue stalled"));
        }
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn heartbeat_rejection_is_treated_as_a_crash() {
    let builds = counter();
    let b = builds.clone();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(
            ChildSpec::new("flaky", RestartPolicy::Permanent, move || {
                let reject = b.fetch_add(1, Ordering::SeqCst) == 0;
                async move { Ok::<WorkerRef, WorkerError>(Arc::new(Flaky { reject })) }
            })
            .with_heartbeat(Duration::from_millis(100), Some(Duration::from_millis(50))),
        )
        .build();
    let reasons: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = reasons.clone();
    sup.bus()
        .on(EventKind::ChildCrashed.as_str(), move |ev| {
            sink.lock()
                .unwrap()
                .push(ev.field_str("reason").unwrap_or_default().to_string());
        })
        .unwrap();

    sup.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(*reasons.lock().unwrap(), vec!["worker_heartbeat_failed"]);
    let info = sup.child_state("flaky").unwrap();
    assert_eq!(info.status, ChildStatus::Running);
    assert_eq!(info.generation, 2);
    assert_eq!(sup.active_heartbeats(), 1);
}

#[tokio::test(start_paused = true)]
async fn duplicate_reports_queued_behind_a_sibling_restart_count_once() {
    let a_builds = counter();
    let calls = a_builds.clone();
    let b = counter();
    let sup = Supervisor::builder("root", SupervisorConfig::default())
        .with_child(ChildSpec::new("a", RestartPolicy::Permanent, move || {
            // Restarts of `a` keep the flow busy for a second.
            let slow = calls.fetch_add(1, Ordering::SeqCst) > 0;
            async move {
                if slow {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Ok::<WorkerRef, WorkerError>(Arc::new(Agent { hang: false }))
            }
        }))
        .with_child(spec("b", RestartPolicy::Permanent, &b))
        .build();
    sup.start().await.unwrap();

    let s = sup.clone();
    let crash_a = tokio::spawn(async move {
        s.handle_child_crash("a", WorkerError::crashed("a down")).await;
    });
    tokio::task::yield_now().await;
    assert_eq!(sup.child_state("a").unwrap().status, ChildStatus::Restarting);

    let reports: Vec<_> = (0..2)
        .map(|_| {
            let s = sup.clone();
            tokio::spawn(async move {
                s.handle_child_crash("b", WorkerError::crashed("b down")).await;
            })
        })
        .collect();
    tokio::task::yield_now().await;

    crash_a.await.unwrap();
    for r in reports {
        r.await.unwrap();
    }

    assert_eq!(b.load(Ordering::SeqCst), 2);
    let info = sup.child_state("b").unwrap();
    assert_eq!(info.status, ChildStatus::Running);
    assert_eq!(info.generation, 2);
    assert_eq!(info.restarts_in_window, 1);
}

#[tokio::test]
async fn one_for_all_keeps_restarting_after_a_sibling_fails() {
    let (a, c) = (counter(), counter());
    let b_builds = counter();
    let calls = b_builds.clone();
    let cfg = SupervisorConfig::default().with_strategy(RestartStrategy::OneForAll);
    let sup = Supervisor::builder("root", cfg)
        .with_child(spec("a", RestartPolicy::Permanent, &a))
        .with_child(ChildSpec::new("b", RestartPolicy::Permanent, move || {
            // Only the first build of `b` succeeds.
            let first = calls.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    Ok::<WorkerRef, WorkerError>(Arc::new(Agent { hang: false }))
                } else {
                    Err(WorkerError::factory("no capacity"))
                }
            }
        }))
        .with_child(spec("c", RestartPolicy::Permanent, &c))
        .build();
    sup.start().await.unwrap();
    let log = record(sup.bus());

    sup.handle_child_crash("a", WorkerError::crashed("boom")).await;

    let log = log.lock().unwrap();
    assert_eq!(
        log[..7],
        [
            ev(EventKind::ChildCrashed, "a"),
            ev(EventKind::ChildStopped, "a"),
            ev(EventKind::ChildStopped, "b"),
            ev(EventKind::ChildStopped, "c"),
            ev(EventKind::ChildRestarted, "a"),
            ev(EventKind::ChildRestarted, "c"),
            ev(EventKind::ChildCrashed, "b"),
        ]
    );
    // The failed restart of `b` re-entered the crash path until its budget
    // (3 restarts) ran out: one start, one restart in `a`'s pass, three more.
    assert_eq!(b_builds.load(Ordering::SeqCst), 5);
    assert_eq!(
        log.iter()
            .filter(|e| **e == ev(EventKind::IntensityExceeded, "b"))
            .count(),
        1
    );
    assert_eq!(sup.child_state("b").unwrap().status, ChildStatus::Stopped);
    assert_eq!(sup.child_state("a").unwrap().status, ChildStatus::Running);
    assert_eq!(sup.child_state("c").unwrap().status, ChildStatus::Running);
}
