//! Controller task tests: command dispatch, periodic refresh and shutdown.

use std::time::Duration;

use woodpecker_witness::WitnessKeys;

use super::helpers::*;
use crate::error::ControllerError;
use crate::service::{self, ServiceConfig};

fn config(refresh_interval: Duration) -> ServiceConfig {
    ServiceConfig {
        refresh_interval,
        load_on_start: true,
    }
}

#[tokio::test]
async fn test_handle_drives_controller() {
    let a = TestLog::new(LOG_A, 1);
    let b = TestLog::new(LOG_B, 2);
    a.publish(10);
    b.publish(4);
    let c = controller(&[&a, &b], FakeQuorum::new(Behavior::Serve), WitnessKeys::default(), 2);

    let svc = service::spawn(c, config(Duration::from_secs(3600)));
    let handle = svc.handle();

    handle.prev_leaf().await.unwrap();
    assert_eq!(handle.model().leaf().index, 8);

    let err = handle.get_leaf(10).await.unwrap_err();
    assert!(err.is_out_of_range());

    handle.select_log(LOG_B).await.unwrap();
    assert_eq!(handle.model().checkpoint().unwrap().size, 4);
    assert_eq!(handle.model().leaf().index, 3);

    svc.stop().await;
}

#[tokio::test]
async fn test_initial_load_runs_before_commands() {
    let log = TestLog::new(LOG_A, 1);
    log.publish(3);
    let c = controller(&[&log], FakeQuorum::new(Behavior::Serve), WitnessKeys::default(), 2);

    let svc = service::spawn(c, config(Duration::from_secs(3600)));
    let handle = svc.handle();

    // Any command is queued behind the initial load.
    handle.inc_witnesses().await.unwrap();
    let state = handle.model().snapshot();
    assert_eq!(state.checkpoint.unwrap().size, 3);
    assert_eq!(state.leaf.index, 2);

    svc.stop().await;
}

#[tokio::test]
async fn test_periodic_refresh_picks_up_growth() {
    let log = TestLog::new(LOG_A, 1);
    log.publish(5);
    let c = controller(&[&log], FakeQuorum::new(Behavior::Serve), WitnessKeys::default(), 2);

    let svc = service::spawn(c, config(Duration::from_millis(20)));
    let model = svc.model().clone();
    next_change(&model).await;

    log.publish(8);
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            model.dirty().wait().await;
            if model.checkpoint().is_some_and(|cp| cp.size == 8) {
                break;
            }
        }
    })
    .await
    .expect("refresh did not pick up the new checkpoint");

    // The timer only refreshes the checkpoint; the leaf stays put.
    assert_eq!(model.leaf().index, 4);

    svc.stop().await;
}

#[tokio::test]
async fn test_shutdown_cancels_hanging_refresh() {
    let log = TestLog::new(LOG_A, 1);
    log.publish(5);
    let (w1, w2) = (witness(1), witness(2));
    let quorum = FakeQuorum::new(Behavior::Hang);
    let c = controller(&[&log], quorum.clone(), witness_keys(&[&w1, &w2]), 2);

    let svc = service::spawn(c, config(Duration::from_secs(3600)));
    let handle = svc.handle();

    // Wait until the initial load is stuck on the witness source.
    tokio::time::timeout(Duration::from_secs(5), async {
        while quorum.requests().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(5), svc.stop())
        .await
        .expect("shutdown hung");

    let err = handle.refresh().await.unwrap_err();
    assert!(matches!(*err, ControllerError::Stopped));
}

#[tokio::test]
async fn test_shutdown_answers_pending_command_with_stopped() {
    let log = TestLog::new(LOG_A, 1);
    log.publish(5);
    let (w1, w2) = (witness(1), witness(2));
    let quorum = FakeQuorum::new(Behavior::Serve);
    let c = controller(&[&log], quorum.clone(), witness_keys(&[&w1, &w2]), 2);

    let svc = service::spawn(c, config(Duration::from_secs(3600)));
    let handle = svc.handle();
    handle.refresh().await.unwrap();

    quorum.set_behavior(Behavior::Hang);
    let pending = tokio::spawn({
        let handle = handle.clone();
        async move { handle.refresh().await }
    });
    tokio::time::timeout(Duration::from_secs(5), async {
        while quorum.requests().len() < 3 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    assert!(svc.is_running());
    svc.stop().await;

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(*err, ControllerError::Stopped));
}
