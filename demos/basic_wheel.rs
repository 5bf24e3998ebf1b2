//! # Example: Basic Wheel
//!
//! Schedules a few callbacks, replaces one, cancels another and stops the wheel.
//! Every wheel event is printed through the built-in `LogWriter`.
//!
//! ```bash
//! RUST_LOG=info cargo run --example basic_wheel --features logging
//! ```

use std::{sync::Arc, time::Duration};

use timewheel::{LogWriter, Subscribe, TaskError, TaskFn, TaskRef, TimeWheel, WheelConfig};
use tracing_subscriber::EnvFilter;

/// Callback that prints its label and optionally fails.
fn make_task(label: &'static str, fail: bool) -> TaskRef {
    TaskFn::arc(move || async move {
        println!("[{label}] fired");
        if fail {
            return Err(TaskError::fail(format!("{label} refused to run")));
        }
        Ok(())
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let wheel = TimeWheel::builder(WheelConfig::new(10, Duration::from_millis(100)))
        .with_subscribers(subs)
        .build();

    wheel
        .add_task_after("greet", make_task("greet", false), Duration::from_millis(250))
        .await;
    wheel
        .add_task_after("flaky", make_task("flaky", true), Duration::from_millis(400))
        .await;
    wheel
        .add_task_after("report", make_task("report-v1", false), Duration::from_millis(300))
        .await;
    // Same key: the first version is dropped without firing.
    wheel
        .add_task_after("report", make_task("report-v2", false), Duration::from_millis(1500))
        .await;
    wheel
        .add_task_after("cleanup", make_task("cleanup", false), Duration::from_secs(3))
        .await;

    println!("pending: {:?}", wheel.pending_tasks().await);
    wheel.remove_task("cleanup").await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("pending after 2s: {:?}", wheel.pending_tasks().await);

    wheel.stop();
    wheel.stopped().await;
    // Let the subscriber drain the final event.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
