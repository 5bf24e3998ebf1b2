use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use timewheel::{
    Event, EventKind, Subscribe, Task, TaskError, TaskFn, TaskRef, TimeWheel, WheelConfig,
};
use tokio::time::{Instant, sleep};

/// Records `(key, fired_at)` for every callback run.
#[derive(Clone, Default)]
struct Fired(Arc<Mutex<Vec<(String, Instant)>>>);

impl Fired {
    fn task(&self, key: &str) -> TaskRef {
        let log = self.0.clone();
        let key = key.to_string();
        TaskFn::arc(move || {
            let log = log.clone();
            let key = key.clone();
            async move {
                log.lock().unwrap().push((key, Instant::now()));
                Ok::<(), TaskError>(())
            }
        })
    }

    fn keys(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    fn at(&self, key: &str) -> Option<Instant> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, at)| *at)
    }
}

#[derive(Clone, Default)]
struct Collect(Arc<Mutex<Vec<Event>>>);

impl Collect {
    fn of(&self, kind: EventKind) -> Vec<Event> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().unwrap().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

fn wheel_with(collect: &Collect, slot_count: usize, interval: Duration) -> TimeWheel {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(collect.clone())];
    TimeWheel::builder(WheelConfig::new(slot_count, interval))
        .with_subscribers(subs)
        .build()
}

#[tokio::test(start_paused = true)]
async fn replaced_task_fires_once_at_its_new_time() {
    let fired = Fired::default();
    let start = Instant::now();
    let wheel = TimeWheel::new(WheelConfig::new(10, Duration::from_millis(500)));

    wheel.add_task("a", fired.task("a"), start + Duration::from_secs(1)).await;
    wheel.add_task("b", fired.task("b-old"), start + Duration::from_secs(2)).await;
    wheel.add_task("b", fired.task("b-new"), start + Duration::from_secs(5)).await;
    assert_eq!(wheel.pending_tasks().await, vec!["a".to_string(), "b".to_string()]);

    sleep(Duration::from_secs(7)).await;

    assert_eq!(fired.keys(), vec!["a".to_string(), "b-new".to_string()]);
    let a = fired.at("a").unwrap() - start;
    assert!(a >= Duration::from_secs(1) && a <= Duration::from_millis(1500), "a fired at {a:?}");
    assert_eq!(fired.at("b-new").unwrap() - start, Duration::from_millis(5500));
    assert!(wheel.pending_tasks().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn add_between_ticks_fires_within_one_interval_of_execute_at() {
    let interval = Duration::from_millis(500);

    // (offset from construction, delay, expected firing offset), all in ms.
    let cases = [
        (400, 900, 1000),
        (100, 450, 500),
        (250, 1000, 1500),
        (400, 100, 500),
        (0, 1000, 1500),
        (499, 4999, 5000),
    ];
    for (offset, delay, expected) in cases {
        let fired = Fired::default();
        let start = Instant::now();
        let wheel = TimeWheel::new(WheelConfig::new(10, interval));

        sleep(Duration::from_millis(offset)).await;
        let execute_at = Instant::now() + Duration::from_millis(delay);
        wheel.add_task("t", fired.task("t"), execute_at).await;

        sleep(Duration::from_millis(delay) + interval * 2).await;
        let at = fired.at("t").expect("task must fire");
        assert_eq!(at - start, Duration::from_millis(expected), "offset {offset}, delay {delay}");
        assert!(at + interval > execute_at, "fired a full interval early");
        assert!(at <= execute_at + interval, "fired more than an interval late");

        wheel.stop();
        wheel.stopped().await;
    }
}

#[tokio::test(start_paused = true)]
async fn past_instant_fires_on_first_tick() {
    let fired = Fired::default();
    let start = Instant::now();
    let wheel = TimeWheel::new(WheelConfig::new(10, Duration::from_millis(500)));

    let past = start.checked_sub(Duration::from_secs(3)).unwrap_or(start);
    wheel.add_task("late", fired.task("late"), past).await;

    sleep(Duration::from_secs(1)).await;
    assert_eq!(fired.at("late").unwrap() - start, Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn long_delay_uses_rotations() {
    let fired = Fired::default();
    let collect = Collect::default();
    let start = Instant::now();
    let wheel = wheel_with(&collect, 4, Duration::from_millis(100));

    wheel
        .add_task_after("far", fired.task("far"), Duration::from_secs(1))
        .await;

    sleep(Duration::from_millis(1050)).await;
    assert!(fired.keys().is_empty(), "must not fire on an earlier lap");

    sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.at("far").unwrap() - start, Duration::from_millis(1100));

    let scheduled = collect.of(EventKind::TaskScheduled);
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].slot, Some(2));
    assert_eq!(scheduled[0].cycle, Some(2));
    assert_eq!(collect.of(EventKind::TaskFired).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn removed_task_never_fires() {
    let fired = Fired::default();
    let collect = Collect::default();
    let wheel = wheel_with(&collect, 10, Duration::from_millis(100));

    wheel
        .add_task_after("x", fired.task("x"), Duration::from_millis(300))
        .await;
    wheel.remove_task("x").await;
    wheel.remove_task("x").await;
    wheel.remove_task("unknown").await;
    assert!(wheel.pending_tasks().await.is_empty());

    sleep(Duration::from_secs(2)).await;
    assert!(fired.keys().is_empty());

    let cancelled = collect.of(EventKind::TaskCancelled);
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].task.as_deref(), Some("x"));
}

fn explode() -> Result<(), TaskError> {
    panic!("callback exploded")
}

#[tokio::test(start_paused = true)]
async fn failing_callbacks_are_isolated() {
    let fired = Fired::default();
    let collect = Collect::default();
    let wheel = wheel_with(&collect, 10, Duration::from_millis(100));
    let delay = Duration::from_millis(200);

    let panics: TaskRef = TaskFn::arc(|| async { explode() });
    let fails: TaskRef = TaskFn::arc(|| async { Err::<(), _>(TaskError::fail("boom")) });

    wheel.add_task_after("panics", panics, delay).await;
    wheel.add_task_after("fails", fails, delay).await;
    wheel.add_task_after("ok", fired.task("ok"), delay).await;

    sleep(Duration::from_secs(1)).await;
    assert_eq!(fired.keys(), vec!["ok".to_string()]);

    let panicked = collect.of(EventKind::CallbackPanicked);
    assert_eq!(panicked.len(), 1);
    assert_eq!(panicked[0].task.as_deref(), Some("panics"));
    assert_eq!(panicked[0].reason.as_deref(), Some("callback exploded"));

    let failed = collect.of(EventKind::CallbackFailed);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].task.as_deref(), Some("fails"));
    assert_eq!(failed[0].reason.as_deref(), Some("execution failed: boom"));

    // The wheel keeps working afterwards.
    wheel
        .add_task_after("again", fired.task("again"), delay)
        .await;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(fired.keys(), vec!["ok".to_string(), "again".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_drops_pending() {
    let fired = Fired::default();
    let collect = Collect::default();
    let wheel = wheel_with(&collect, 10, Duration::from_millis(100));
    let other = wheel.clone();

    wheel
        .add_task_after("pending", fired.task("pending"), Duration::from_millis(500))
        .await;

    wheel.stop();
    other.stop();
    wheel.stop();
    wheel.stopped().await;
    assert!(wheel.is_stopped());
    assert!(other.is_stopped());

    wheel
        .add_task_after("late", fired.task("late"), Duration::ZERO)
        .await;
    other.remove_task("pending").await;
    assert!(wheel.pending_tasks().await.is_empty());

    sleep(Duration::from_secs(2)).await;
    assert!(fired.keys().is_empty());

    let stopped = collect.of(EventKind::WheelStopped);
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].reason.as_deref(), Some("stop_requested"));
    assert_eq!(stopped[0].dropped, Some(1));
    assert_eq!(stopped[0].cycle, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stop_from_many_threads() {
    let collect = Collect::default();
    let wheel = wheel_with(&collect, 10, Duration::from_millis(10));
    let gate = Arc::new(tokio::sync::Barrier::new(8));

    let mut joins = Vec::new();
    for _ in 0..8 {
        let w = wheel.clone();
        let gate = gate.clone();
        joins.push(tokio::spawn(async move {
            gate.wait().await;
            w.stop();
        }));
    }
    for j in joins {
        j.await.unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), wheel.stopped())
        .await
        .expect("controller must exit");
    assert!(wheel.is_stopped());

    let deadline = Instant::now() + Duration::from_secs(5);
    while collect.of(EventKind::WheelStopped).is_empty() && Instant::now() < deadline {
        sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(collect.of(EventKind::WheelStopped).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_controller() {
    let collect = Collect::default();
    let wheel = wheel_with(&collect, 10, Duration::from_millis(100));
    drop(wheel);

    sleep(Duration::from_millis(50)).await;
    let stopped = collect.of(EventKind::WheelStopped);
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].reason.as_deref(), Some("handles_dropped"));
}

/// Task whose destructor panics, to fault the controller while it handles `add`.
struct PanicOnDrop;

impl Task for PanicOnDrop {
    fn spawn(&self) -> timewheel::BoxTaskFuture {
        Box::pin(async { Ok(()) })
    }
}

impl Drop for PanicOnDrop {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            panic!("drop exploded");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn controller_survives_a_panicking_command() {
    let fired = Fired::default();
    let collect = Collect::default();
    let wheel = wheel_with(&collect, 10, Duration::from_millis(100));

    wheel
        .add_task_after("k", Arc::new(PanicOnDrop), Duration::from_secs(5))
        .await;
    // Replacing drops the old callback inside the controller.
    wheel
        .add_task_after("k", fired.task("k"), Duration::from_millis(200))
        .await;

    assert_eq!(wheel.pending_tasks().await, vec!["k".to_string()]);
    sleep(Duration::from_secs(1)).await;
    assert_eq!(fired.keys(), vec!["k".to_string()]);

    let panicked = collect.of(EventKind::CommandPanicked);
    assert_eq!(panicked.len(), 1);
    assert_eq!(panicked[0].task.as_deref(), Some("k"));
    assert_eq!(panicked[0].reason.as_deref(), Some("add: drop exploded"));
    assert!(!wheel.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn many_handles_add_concurrently() {
    let fired = Fired::default();
    let wheel = TimeWheel::new(WheelConfig::new(16, Duration::from_millis(10)));

    let mut joins = Vec::new();
    for i in 0..20 {
        let w = wheel.clone();
        let task = fired.task(&format!("t{i:02}"));
        joins.push(tokio::spawn(async move {
            w.add_task_after(format!("t{i:02}"), task, Duration::from_millis(100))
                .await;
        }));
    }
    for j in joins {
        j.await.unwrap();
    }

    let pending = wheel.pending_tasks().await;
    let expected: Vec<String> = (0..20).map(|i| format!("t{i:02}")).collect();
    assert_eq!(pending, expected);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(fired.keys().len(), 20);
}

#[tokio::test]
async fn zero_config_falls_back_to_defaults() {
    let wheel = TimeWheel::new(WheelConfig::new(0, Duration::ZERO));
    assert_eq!(wheel.slot_count(), timewheel::DEFAULT_SLOT_COUNT);
    assert_eq!(wheel.interval(), timewheel::DEFAULT_INTERVAL);
    wheel.stop();
    wheel.stopped().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_api_from_sync_code() {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let wheel = TimeWheel::new(WheelConfig::new(10, Duration::from_millis(10)));

    let w = wheel.clone();
    tokio::task::spawn_blocking(move || {
        let ping: TaskRef = TaskFn::arc(move || {
            let tx = tx.clone();
            async move {
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(());
                }
                Ok::<(), TaskError>(())
            }
        });
        w.blocking_add_task("ping", ping, Instant::now() + Duration::from_millis(30));
        w.blocking_add_task(
            "gone",
            TaskFn::arc(|| async { Ok::<(), TaskError>(()) }),
            Instant::now() + Duration::from_secs(60),
        );
        w.blocking_remove_task("gone");
    })
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("ping must fire")
        .unwrap();
    assert!(wheel.pending_tasks().await.is_empty());

    wheel.stop();
    wheel.stopped().await;
}
