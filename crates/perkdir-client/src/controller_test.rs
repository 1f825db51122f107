use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use perkdir_core::MerchantRef;
use tokio::sync::oneshot;

use super::*;
use crate::error::ClientError;

type FetchResult = Result<Vec<PerkRecord>, ClientError>;

/// Source whose single fetch stays pending until the test resolves the gate.
struct GatedSource {
    gate: Mutex<Option<oneshot::Receiver<FetchResult>>>,
    calls: Arc<AtomicUsize>,
}

fn gated() -> (GatedSource, oneshot::Sender<FetchResult>, Arc<AtomicUsize>) {
    let (tx, rx) = oneshot::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let source = GatedSource {
        gate: Mutex::new(Some(rx)),
        calls: Arc::clone(&calls),
    };
    (source, tx, calls)
}

impl PerkSource for GatedSource {
    fn fetch_public_perks(&self) -> impl Future<Output = FetchResult> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        async move {
            let rx = gate.expect("fetch issued more than once");
            rx.await.expect("gate sender dropped")
        }
    }
}

fn records() -> Vec<PerkRecord> {
    vec![
        PerkRecord::new("p1", "10% Off Widgets", MerchantRef::embedded("m1", "Acme")),
        PerkRecord::new("p2", "Free Coffee", MerchantRef::bare("Bean Co")),
    ]
}

#[tokio::test]
async fn starts_idle_and_loads_once() {
    let (source, tx, calls) = gated();
    let mut controller = FetchController::new(source);
    assert!(matches!(controller.state(), FetchState::Idle));

    assert!(controller.activate());
    assert!(matches!(controller.state(), FetchState::Loading));
    assert!(!controller.activate(), "second activation must not refetch");

    tx.send(Ok(records())).unwrap();
    let state = controller.settled().await;

    let FetchState::Ready(snapshot) = state else {
        panic!("expected Ready, got {state:?}");
    };
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.records()[0].title(), Some("10% Off Widgets"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_fetch_becomes_error_state() {
    let (source, tx, _) = gated();
    let mut controller = FetchController::new(source);
    controller.activate();

    tx.send(Err(ClientError::UnexpectedStatus {
        status: 503,
        url: "http://perks.test/api/perks/all".to_owned(),
    }))
    .unwrap();

    match controller.settled().await {
        FetchState::Error(reason) => assert!(reason.contains("503"), "reason: {reason}"),
        other => panic!("expected Error, got {other:?}"),
    }
    assert!(!matches!(controller.state(), FetchState::Loading));
}

#[tokio::test]
async fn subscribers_observe_the_transition() {
    let (source, tx, _) = gated();
    let mut controller = FetchController::new(source);
    let mut subscriber = controller.subscribe();
    controller.activate();
    assert!(matches!(*subscriber.borrow_and_update(), FetchState::Loading));

    tx.send(Ok(Vec::new())).unwrap();
    subscriber.changed().await.unwrap();
    assert!(matches!(*subscriber.borrow(), FetchState::Ready(ref s) if s.is_empty()));
}

#[tokio::test]
async fn teardown_discards_pending_result() {
    let (source, tx, _) = gated();
    let mut controller = FetchController::new(source);
    let mut subscriber = controller.subscribe();
    controller.activate();
    subscriber.borrow_and_update();

    controller.teardown();
    // The gate may already be gone with the aborted task; either way nothing
    // may reach subscribers.
    let _ = tx.send(Ok(records()));
    tokio::task::yield_now().await;

    assert!(controller.is_torn_down());
    assert!(matches!(controller.state(), FetchState::Loading));
    assert!(
        subscriber.changed().await.is_err(),
        "no state may be published after teardown"
    );
}

#[tokio::test]
async fn publish_after_teardown_is_rejected() {
    let (source, _tx, _) = gated();
    let mut controller = FetchController::new(source);
    controller.teardown();

    let late = FetchState::Ready(PerkSnapshot::new(records()));
    assert!(!publish(&controller.publisher, late));
    assert!(matches!(controller.state(), FetchState::Idle));
    assert!(!controller.activate(), "a torn-down controller cannot start");
}

#[tokio::test]
async fn settled_returns_immediately_when_torn_down() {
    let (source, _tx, _) = gated();
    let mut controller = FetchController::new(source);
    controller.activate();
    controller.teardown();
    assert!(matches!(controller.settled().await, FetchState::Loading));
}

#[tokio::test]
async fn dropping_the_controller_closes_the_channel() {
    let (source, _tx, _) = gated();
    let mut controller = FetchController::new(source);
    let mut subscriber = controller.subscribe();
    controller.activate();
    subscriber.borrow_and_update();

    drop(controller);
    assert!(subscriber.changed().await.is_err());
}
