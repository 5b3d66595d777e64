//! Concurrency tests for session lanes and the registry
//!
//! Commands fired at the same session from many tasks must end in a state
//! some serial ordering could have produced. Sessions never affect each
//! other.

mod helpers;

use helpers::{playlist, StaticResolver, TestJukebox};
use jukebox_common::events::PlaybackState;
use jukebox_common::SessionId;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueues_are_linearizable() {
    let jukebox = Arc::new(TestJukebox::new(StaticResolver::new()));
    let session = jukebox.session("guild-1").await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move {
            session.play(&format!("song{}", i), "alice").await
        }));
    }

    let mut starts = 0;
    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        if outcome.playback.is_some() {
            starts += 1;
        }
    }
    // Exactly one enqueue found the session idle
    assert_eq!(starts, 1);

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.pending.len(), 19);

    let mut titles: HashSet<String> = snapshot
        .pending
        .iter()
        .map(|t| t.title().to_string())
        .collect();
    titles.insert(snapshot.current.unwrap().title().to_string());
    assert_eq!(titles.len(), 20);
    assert_eq!(jukebox.engine("guild-1").started().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_commands_leave_consistent_state() {
    let resolver = StaticResolver::new().with("mix", playlist("t", 10));
    let jukebox = Arc::new(TestJukebox::new(resolver));
    let session = jukebox.session("guild-1").await;
    session.play("mix", "alice").await.unwrap();
    let engine = jukebox.engine("guild-1");

    let mut tasks = Vec::new();
    for i in 0..30 {
        let session = session.clone();
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            match i % 5 {
                0 => {
                    let _ = session.skip().await;
                }
                1 => {
                    engine.finish_current(Ok(()));
                }
                2 => {
                    let _ = session.play(&format!("extra{}", i), "bob").await;
                }
                3 => {
                    let _ = session.move_track(1, 2).await;
                }
                _ => {
                    let _ = session.snapshot().await;
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let snapshot = session.snapshot().await.unwrap();
    // A current track exists exactly when the controller is active
    assert_eq!(snapshot.current.is_some(), snapshot.state.is_active());
    if let Some(current) = &snapshot.current {
        assert!(snapshot.pending.iter().all(|t| t.id() != current.id()));
        assert_eq!(engine.active_source().as_deref(), Some(current.source_ref()));
    }
    assert_eq!(snapshot.consecutive_errors, 0);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let jukebox = TestJukebox::new(StaticResolver::new());
    let a = jukebox.session("guild-a").await;
    let b = jukebox.session("guild-b").await;

    a.play("songA", "alice").await.unwrap();
    b.play("songB", "bob").await.unwrap();
    a.stop().await.unwrap();

    assert_eq!(a.snapshot().await.unwrap().state, PlaybackState::Idle);
    let snapshot = b.snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.current.unwrap().title(), "songB");
    assert_eq!(jukebox.engine("guild-b").started(), vec!["songB"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registry_get_or_create_is_atomic() {
    let jukebox = Arc::new(TestJukebox::new(StaticResolver::new()));

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let jukebox = jukebox.clone();
        tasks.push(tokio::spawn(async move {
            jukebox
                .registry
                .get_or_create(&SessionId::from("shared"))
                .await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().session_id().as_str(), "shared");
    }

    assert_eq!(jukebox.registry.session_count().await, 1);
    assert_eq!(jukebox.engines.created(), 1);
}

#[tokio::test]
async fn test_session_keeps_queue_after_emptying() {
    let jukebox = TestJukebox::new(StaticResolver::new());
    let session = jukebox.session("guild-1").await;

    session.play("songA", "alice").await.unwrap();
    jukebox.engine("guild-1").finish_current(Ok(()));
    session.set_volume(70).await.unwrap();

    let again = jukebox.session("guild-1").await;
    let snapshot = again.snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert!((snapshot.volume - 0.7).abs() < f32::EPSILON);
    assert_eq!(
        jukebox.registry.session_ids().await,
        vec![SessionId::from("guild-1")]
    );
}
