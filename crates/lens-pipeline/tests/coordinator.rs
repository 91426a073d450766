//! Session coordinator behavior against an in-memory store and scripted fakes.

mod support;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use lens_core::enums::{RunStatus, StageType};
use lens_pipeline::{
    AllowAll, ClassLocks, NoProgress, ProgressEvent, ProgressReporter, RunError, StageError,
    StageOutcome,
};

use support::{
    CLASS, CancelAfter, DenyAll, FailingStore, RecordingSink, ScriptedService, coordinator,
    memory_store,
};

#[tokio::test]
async fn full_run_persists_every_stage_under_one_session() {
    let store = Arc::new(memory_store().await);
    let service = Arc::new(ScriptedService::default());
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        AllowAll,
        ClassLocks::new(),
    );

    let report = coord
        .run(CLASS, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.persisted_count(), 9);
    assert_eq!(service.called_stages(), StageType::ALL.to_vec());

    let groups = store.list_session_groups(CLASS).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].session_id.as_ref(), Some(&report.session_id));
    assert!(groups[0].is_complete());
}

#[tokio::test]
async fn each_run_mints_a_new_session() {
    let store = Arc::new(memory_store().await);
    let coord = coordinator(
        Arc::clone(&store),
        Arc::new(ScriptedService::default()),
        AllowAll,
        ClassLocks::new(),
    );
    let cancel = CancellationToken::new();

    let first = coord.run(CLASS, &cancel, &NoProgress).await.unwrap();
    let second = coord.run(CLASS, &cancel, &NoProgress).await.unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(store.list_results(CLASS).await.unwrap().len(), 18);
    assert_eq!(store.list_session_groups(CLASS).await.unwrap().len(), 2);
}

#[tokio::test]
async fn service_failure_at_stage_five_aborts_the_rest() {
    let store = Arc::new(memory_store().await);
    let service = Arc::new(ScriptedService::failing_on(StageType::Students4));
    let locks = ClassLocks::new();
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        AllowAll,
        locks.clone(),
    );

    let err = coord
        .run(CLASS, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap_err();

    let RunError::StageFailed {
        session_id,
        stage,
        report,
        source,
    } = err
    else {
        panic!("expected StageFailed");
    };
    assert_eq!(stage, StageType::Students4);
    assert!(matches!(source, StageError::Service(_)));
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.outcomes.len(), 4);

    // Stages 1-4 durable, stage 5 absent, stages 6-9 never called.
    let stored: Vec<StageType> = StageType::ALL[..4].to_vec();
    for stage in StageType::ALL {
        let row = store
            .get_by_session_and_type(CLASS, stage, &session_id)
            .await
            .unwrap();
        assert_eq!(row.is_some(), stored.contains(&stage), "stage {stage}");
    }
    assert_eq!(service.called_stages(), StageType::ALL[..5].to_vec());
    assert!(!locks.is_held(CLASS));
}

#[tokio::test]
async fn store_failure_aborts_like_service_failure() {
    let inner = memory_store().await;
    let store = Arc::new(FailingStore {
        inner,
        fail_on: StageType::Students2,
    });
    let service = Arc::new(ScriptedService::default());
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        AllowAll,
        ClassLocks::new(),
    );

    let err = coord
        .run(CLASS, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RunError::StageFailed {
            stage: StageType::Students2,
            source: StageError::Store(_),
            ..
        }
    ));
    assert_eq!(service.called_stages(), StageType::ALL[..3].to_vec());
    assert_eq!(store.inner.list_results(CLASS).await.unwrap().len(), 2);
}

#[tokio::test]
async fn denying_guard_completes_without_writes() {
    let store = Arc::new(memory_store().await);
    let service = Arc::new(ScriptedService::default());
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        DenyAll,
        ClassLocks::new(),
    );
    let sink = RecordingSink::default();

    let report = coord
        .run(CLASS, &CancellationToken::new(), &sink)
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.outcomes.len(), 9);
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| matches!(o, StageOutcome::Skipped { .. }))
    );
    assert!(store.list_results(CLASS).await.unwrap().is_empty());
    assert!(service.called_stages().is_empty());

    let expected: Vec<String> = StageType::ALL.iter().map(|s| s.label()).collect();
    assert_eq!(sink.started_labels(), expected);
}

#[tokio::test]
async fn reporter_follows_the_run() {
    let store = Arc::new(memory_store().await);
    let coord = coordinator(
        store,
        Arc::new(ScriptedService::default()),
        AllowAll,
        ClassLocks::new(),
    );
    let reporter = ProgressReporter::new();

    let report = coord
        .run(CLASS, &CancellationToken::new(), &reporter)
        .await
        .unwrap();

    let snapshot = reporter.snapshot();
    assert!(!reporter.is_running());
    assert_eq!(reporter.current_stage_label(), None);
    assert_eq!(snapshot.session_id, Some(report.session_id));
    assert_eq!(snapshot.completed_stages, 9);
    assert_eq!(snapshot.total_stages, 9);
    assert_eq!(snapshot.status, Some(RunStatus::Completed));
}

#[tokio::test]
async fn progress_events_bracket_each_stage() {
    let store = Arc::new(memory_store().await);
    let coord = coordinator(
        store,
        Arc::new(ScriptedService::default()),
        AllowAll,
        ClassLocks::new(),
    );
    let sink = RecordingSink::default();
    coord
        .run(CLASS, &CancellationToken::new(), &sink)
        .await
        .unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1 + 9 * 2 + 1);
    assert!(matches!(events[0], ProgressEvent::RunStarted { total_stages: 9, .. }));
    assert!(matches!(
        events[1],
        ProgressEvent::StageStarted {
            stage: StageType::Overview,
            index: 0,
            ..
        }
    ));
    assert!(matches!(
        events[2],
        ProgressEvent::StageFinished {
            stage: StageType::Overview,
            persisted: true,
            ..
        }
    ));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::RunFinished {
            status: RunStatus::Completed,
            ..
        })
    ));
}

#[tokio::test]
async fn cancellation_stops_before_the_next_stage() {
    let store = Arc::new(memory_store().await);
    let service = Arc::new(ScriptedService::default());
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        AllowAll,
        ClassLocks::new(),
    );
    let token = CancellationToken::new();
    let sink = CancelAfter {
        token: token.clone(),
        after: StageType::Students1,
    };

    let report = coord.run(CLASS, &token, &sink).await.unwrap();

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(
        service.called_stages(),
        vec![StageType::Overview, StageType::Students1]
    );
    // The stage in flight when cancellation arrived was still persisted.
    assert_eq!(store.list_results(CLASS).await.unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_run_on_same_class_is_rejected() {
    let store = Arc::new(memory_store().await);
    let service = Arc::new(ScriptedService::default());
    let locks = ClassLocks::new();
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        AllowAll,
        locks.clone(),
    );

    let held = locks.try_acquire(CLASS).unwrap();
    let err = coord
        .run(CLASS, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::AlreadyRunning { class_id } if class_id == CLASS));
    assert!(service.called_stages().is_empty());

    drop(held);
    let report = coord
        .run(CLASS, &CancellationToken::new(), &NoProgress)
        .await
        .unwrap();
    assert_eq!(report.status, RunStatus::Completed);
}

#[tokio::test]
async fn unknown_class_fails_on_first_stage() {
    let store = Arc::new(memory_store().await);
    let service = Arc::new(ScriptedService::default());
    let coord = coordinator(
        Arc::clone(&store),
        Arc::clone(&service),
        AllowAll,
        ClassLocks::new(),
    );

    let err = coord
        .run("cls-unknown", &CancellationToken::new(), &NoProgress)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::StageFailed {
            stage: StageType::Overview,
            source: StageError::ClassData(_),
            ..
        }
    ));
    assert!(service.called_stages().is_empty());
}
