//! Room-actor behavior: timers, reconnect grace, snapshot fan-out.
//!
//! These tests run on a paused clock; the runtime auto-advances to the
//! next armed timer whenever every task is idle.

use std::time::Duration;
use tileroom::actor::{RoomEvent, RoomHandle, RoomRegistry};
use tileroom::config::Config;
use tileroom::create_test_registry;
use tileroom::game::room::{Intent, Phase, RoomSnapshot};
use tokio::sync::mpsc;

async fn subscribe(
    handle: &RoomHandle,
    registry: &RoomRegistry,
    player_id: Option<String>,
) -> mpsc::Receiver<RoomSnapshot> {
    let (tx, rx) = mpsc::channel(64);
    handle
        .send(RoomEvent::Subscribe {
            conn_id: registry.next_conn_id(),
            player_id,
            tx,
        })
        .await
        .unwrap();
    rx
}

async fn wait_for(
    rx: &mut mpsc::Receiver<RoomSnapshot>,
    what: &str,
    pred: impl Fn(&RoomSnapshot) -> bool,
) -> RoomSnapshot {
    tokio::time::timeout(Duration::from_secs(600), async {
        loop {
            let snapshot = rx.recv().await.expect("snapshot stream ended");
            if pred(&snapshot) {
                return snapshot;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("never observed: {}", what))
}

#[tokio::test(start_paused = true)]
async fn turn_timeout_applies_forced_fold() {
    let registry = create_test_registry(Config::default());
    let handle = registry.get_or_create("timeout-room").await;

    let mut ids = Vec::new();
    for name in ["Ada", "Ben", "Cleo"] {
        ids.push(handle.join(name.to_string(), None).await.unwrap());
    }
    let mut rx = subscribe(&handle, &registry, Some(ids[0].clone())).await;

    handle.start(ids[0].clone()).await.unwrap();
    let snapshot = wait_for(&mut rx, "hand started", |s| s.phase == Phase::PreFlop).await;
    // First to act sits after the big blind.
    assert_eq!(snapshot.active_player_index, 2);

    // Nobody acts; the 30s turn timer folds Cleo and action moves on.
    let snapshot = wait_for(&mut rx, "forced fold", |s| {
        s.history.iter().any(|e| e.contains("timed out"))
    })
    .await;
    let cleo = snapshot.players.iter().find(|p| p.name == "Cleo").unwrap();
    assert!(cleo.is_folded);
    assert_eq!(snapshot.active_player_index, 0);
}

#[tokio::test(start_paused = true)]
async fn reveal_delay_rolls_into_next_hand() {
    let registry = create_test_registry(Config::default());
    let handle = registry.get_or_create("continuous-room").await;

    let mut ids = Vec::new();
    for name in ["Ada", "Ben", "Cleo"] {
        ids.push(handle.join(name.to_string(), None).await.unwrap());
    }
    let mut rx = subscribe(&handle, &registry, None).await;

    handle.start(ids[0].clone()).await.unwrap();
    handle.intent(ids[2].clone(), Intent::Fold).await.unwrap();
    handle.intent(ids[0].clone(), Intent::Fold).await.unwrap();

    wait_for(&mut rx, "reveal", |s| s.phase == Phase::Reveal).await;
    // After the reveal delay the room deals the next hand by itself.
    let snapshot = wait_for(&mut rx, "next hand", |s| s.hand_no == 2).await;
    assert_eq!(snapshot.phase, Phase::PreFlop);
    assert_eq!(snapshot.dealer_index, 1);
}

#[tokio::test(start_paused = true)]
async fn reconnect_within_grace_keeps_seat() {
    let registry = create_test_registry(Config::default());
    let handle = registry.get_or_create("grace-room").await;

    let ada = handle.join("Ada".to_string(), None).await.unwrap();
    let ben = handle.join("Ben".to_string(), None).await.unwrap();

    // Ben's socket drops...
    handle
        .send(RoomEvent::Disconnected {
            player_id: ben.clone(),
        })
        .await
        .unwrap();

    // ...and he comes back with his old id before the grace expires.
    let again = handle.join("Ben".to_string(), Some(ben.clone())).await.unwrap();
    assert_eq!(again, ben);

    // Long after the original grace deadline, the seat is still there.
    tokio::time::sleep(Duration::from_secs(120)).await;
    let mut rx = subscribe(&handle, &registry, Some(ada.clone())).await;
    let snapshot = rx.recv().await.unwrap();
    assert_eq!(snapshot.players.len(), 2);
    assert!(snapshot.history.iter().any(|e| e.contains("reconnects")));
    assert!(!snapshot.history.iter().any(|e| e.contains("leaves")));
}

#[tokio::test(start_paused = true)]
async fn grace_expiry_removes_player() {
    let registry = create_test_registry(Config::default());
    let handle = registry.get_or_create("expiry-room").await;

    let ada = handle.join("Ada".to_string(), None).await.unwrap();
    let ben = handle.join("Ben".to_string(), None).await.unwrap();

    handle
        .send(RoomEvent::Disconnected { player_id: ben })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(90)).await;

    let mut rx = subscribe(&handle, &registry, Some(ada)).await;
    let snapshot = rx.recv().await.unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert!(snapshot.history.iter().any(|e| e.contains("leaves")));
}

#[tokio::test(start_paused = true)]
async fn snapshots_are_redacted_per_subscriber() {
    let registry = create_test_registry(Config::default());
    let handle = registry.get_or_create("redaction-room").await;

    let ada = handle.join("Ada".to_string(), None).await.unwrap();
    let ben = handle.join("Ben".to_string(), None).await.unwrap();

    let mut ada_rx = subscribe(&handle, &registry, Some(ada.clone())).await;
    let mut spectator_rx = subscribe(&handle, &registry, None).await;

    handle.start(ada.clone()).await.unwrap();

    let ada_view = wait_for(&mut ada_rx, "ada view", |s| s.phase == Phase::PreFlop).await;
    for player in &ada_view.players {
        if player.id == ada {
            assert_eq!(player.hole_cards.len(), 2);
        } else {
            assert!(player.hole_cards.is_empty());
        }
    }

    let spectator_view =
        wait_for(&mut spectator_rx, "spectator view", |s| s.phase == Phase::PreFlop).await;
    assert!(spectator_view
        .players
        .iter()
        .all(|p| p.hole_cards.is_empty()));
    let _ = ben;
}

#[tokio::test(start_paused = true)]
async fn room_rehydrates_from_store_after_idle_retirement() {
    let mut config = Config::default();
    config.room_idle_ms = 1_000;
    let registry = create_test_registry(config);

    let handle = registry.get_or_create("sleepy-room").await;
    let ada = handle.join("Ada".to_string(), None).await.unwrap();

    // No subscribers and nothing in flight: the actor retires.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(handle.is_closed());

    // Next lookup rehydrates the persisted context, seat intact.
    let handle = registry.get_or_create("sleepy-room").await;
    let again = handle.join("Ada".to_string(), Some(ada.clone())).await.unwrap();
    assert_eq!(again, ada);
}
