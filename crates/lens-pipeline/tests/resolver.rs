//! Resolution with session preference and fallback to the newest result.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use lens_core::entities::{AnalysisResult, NewAnalysisResult};
use lens_core::enums::StageType;
use lens_core::ids::SessionId;
use lens_db::service::LensService;
use lens_pipeline::{ResolvedFrom, ResultResolver};

const CLASS: &str = "cls-7a";

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 11, 13, 0, 0).unwrap() + Duration::minutes(minutes)
}

async fn seed(
    store: &LensService,
    stage: StageType,
    session: Option<&str>,
    minutes: i64,
) -> AnalysisResult {
    store
        .upsert_result_at(
            &NewAnalysisResult::new(
                CLASS,
                stage,
                session.and_then(SessionId::parse),
                format!("{stage} {session:?}"),
            ),
            at(minutes),
        )
        .await
        .unwrap()
}

async fn setup() -> (Arc<LensService>, ResultResolver<LensService>) {
    let store = Arc::new(LensService::new_local(":memory:").await.unwrap());
    let resolver = ResultResolver::new(Arc::clone(&store));
    (store, resolver)
}

#[tokio::test]
async fn falls_back_to_newest_of_stage_when_session_lacks_it() {
    let (store, resolver) = setup().await;
    seed(&store, StageType::Students3, None, 0).await;
    let newer = seed(&store, StageType::Students3, Some("ses-2"), 10).await;
    seed(&store, StageType::Overview, Some("ses-1"), 20).await;

    let session = SessionId::parse("ses-1").unwrap();
    let resolved = resolver
        .resolve(CLASS, StageType::Students3, Some(&session))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resolved.result.id, newer.id);
    assert_eq!(resolved.from, ResolvedFrom::Latest);
    assert!(resolved.is_fallback(Some(&session)));
}

#[tokio::test]
async fn prefers_session_match_over_newer_rows() {
    let (store, resolver) = setup().await;
    let own = seed(&store, StageType::Students3, Some("ses-1"), 0).await;
    seed(&store, StageType::Students3, Some("ses-2"), 30).await;

    let session = SessionId::parse("ses-1").unwrap();
    let resolved = resolver
        .resolve(CLASS, StageType::Students3, Some(&session))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.result.id, own.id);
    assert_eq!(resolved.from, ResolvedFrom::Session);
    assert!(!resolved.is_fallback(Some(&session)));
}

#[tokio::test]
async fn no_session_goes_straight_to_latest() {
    let (store, resolver) = setup().await;
    seed(&store, StageType::Overview, Some("ses-1"), 0).await;
    let newest = seed(&store, StageType::Overview, None, 5).await;

    let resolved = resolver
        .resolve(CLASS, StageType::Overview, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.result.id, newest.id);
    assert!(!resolved.is_fallback(None));
}

#[tokio::test]
async fn nothing_for_stage_resolves_to_none() {
    let (store, resolver) = setup().await;
    seed(&store, StageType::Overview, Some("ses-1"), 0).await;

    let session = SessionId::parse("ses-1").unwrap();
    assert!(
        resolver
            .resolve(CLASS, StageType::Students8, Some(&session))
            .await
            .unwrap()
            .is_none()
    );
}
