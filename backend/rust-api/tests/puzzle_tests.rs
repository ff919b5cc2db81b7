mod common;

use axum::http::StatusCode;
use common::{LiveBehavior, ScriptedLiveSource};
use std::sync::Arc;

#[tokio::test]
async fn test_health_reports_offline_source_without_live_provider() {
    let (app, state) = common::create_test_app_with_live(None);

    // Resolve the probe first so the mode is decided.
    let (status, _) = common::get_json(&app, "/api/v1/puzzles/next").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = common::get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["puzzle_source"], "offline");
    assert!(json["live_provider"].is_null());
    assert!(state.selector.live_source().is_none());
}

#[tokio::test]
async fn test_offline_daily_puzzle_is_served() {
    let app = common::create_test_app();

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/daily").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["origin"], "offline");
    assert_eq!(json["slot"], "current");
    assert_eq!(json["applied"], true);
    assert!(json["puzzle"]["puzzle"]["id"]
        .as_str()
        .unwrap()
        .starts_with("OFF"));
    assert!(!json["puzzle"]["puzzle"]["solution"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_offline_puzzle_by_id() {
    let app = common::create_test_app();

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/OFF03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["puzzle"]["puzzle"]["id"], "OFF03");
    assert_eq!(json["puzzle"]["puzzle"]["solution"][0], "g5f7");
}

#[tokio::test]
async fn test_unknown_puzzle_id_returns_not_found() {
    let app = common::create_test_app();

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/doesNotExist?slot=side").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("no puzzle available"));
    assert_eq!(json["slot"], "side");
    assert_eq!(json["slot_state"]["loading"], false);
    assert!(json["slot_state"]["error"].is_string());
}

#[tokio::test]
async fn test_theme_fallback_serves_any_offline_puzzle() {
    let app = common::create_test_app();

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/theme/fork").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["puzzle"]["puzzle"]["id"], "OFF09");

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/theme/zugzwang").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["origin"], "offline");
}

#[tokio::test]
async fn test_rating_request_picks_nearby_offline_puzzle() {
    let app = common::create_test_app();

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/rating/2100").await;

    assert_eq!(status, StatusCode::OK);
    let rating = json["puzzle"]["puzzle"]["rating"].as_u64().unwrap();
    assert!(rating >= 1000, "expected a hard puzzle, got {}", rating);
}

#[tokio::test]
async fn test_invalid_rating_is_rejected() {
    let app = common::create_test_app();

    let (status, _) = common::get_json(&app, "/api/v1/puzzles/rating/high").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slot_state_reflects_last_fetch() {
    let app = common::create_test_app();

    let (status, _) = common::get_json(&app, "/api/v1/puzzles/OFF02?slot=board").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = common::get_json(&app, "/api/v1/slots/board").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["puzzle"]["puzzle"]["id"], "OFF02");
    assert_eq!(json["origin"], "offline");
    assert_eq!(json["loading"], false);
    assert_eq!(json["generation"], 1);

    let (_, json) = common::get_json(&app, "/api/v1/slots/untouched").await;
    assert!(json["puzzle"].is_null());
    assert_eq!(json["generation"], 0);
}

#[tokio::test]
async fn test_healthy_live_source_serves_live_puzzles() {
    let live = Arc::new(ScriptedLiveSource::new(LiveBehavior::Healthy));
    let (app, _) = common::create_test_app_with_live(Some(live.clone()));

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/daily").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["origin"], "live");
    assert_eq!(json["puzzle"]["puzzle"]["id"], "LIVEDAILY");
    assert_eq!(live.calls(), 1);

    let (_, health) = common::get_json(&app, "/health").await;
    assert_eq!(health["puzzle_source"], "live");
    assert_eq!(health["live_provider"], "scripted");
}

#[tokio::test]
async fn test_failed_probe_means_no_live_calls() {
    let live = Arc::new(ScriptedLiveSource::new(LiveBehavior::ProbeFails));
    let (app, _) = common::create_test_app_with_live(Some(live.clone()));

    for uri in [
        "/api/v1/puzzles/daily",
        "/api/v1/puzzles/next",
        "/api/v1/puzzles/theme/fork",
    ] {
        let (status, json) = common::get_json(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["origin"], "offline");
    }

    assert_eq!(live.calls(), 0);
}

#[tokio::test]
async fn test_quota_error_switches_session_offline() {
    let live = Arc::new(ScriptedLiveSource::new(LiveBehavior::QuotaExceeded));
    let (app, state) = common::create_test_app_with_live(Some(live.clone()));

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/next").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["origin"], "offline");
    assert_eq!(live.calls(), 1);

    let (_, json) = common::get_json(&app, "/api/v1/puzzles/daily").await;
    assert_eq!(json["origin"], "offline");
    assert_eq!(live.calls(), 1, "no live call after the quota flip");

    let warnings = state
        .notifications
        .recent()
        .into_iter()
        .filter(|n| n.title == "Using offline puzzles")
        .count();
    assert_eq!(warnings, 1);
}

#[tokio::test]
async fn test_transient_live_failure_falls_back_per_request() {
    let live = Arc::new(ScriptedLiveSource::new(LiveBehavior::Unreachable));
    let (app, _) = common::create_test_app_with_live(Some(live.clone()));

    let (status, json) = common::get_json(&app, "/api/v1/puzzles/OFF01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["origin"], "offline");
    let after_first = live.calls();
    assert!(after_first >= 1);

    // Transport failures do not disable live mode.
    let (_, json) = common::get_json(&app, "/api/v1/puzzles/OFF01").await;
    assert_eq!(json["origin"], "offline");
    assert!(live.calls() > after_first);
}

#[tokio::test]
async fn test_remote_dashboard_requires_live_mode() {
    let app = common::create_test_app();
    let (status, _) = common::get_json(&app, "/api/v1/remote/dashboard?days=7").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let live = Arc::new(ScriptedLiveSource::new(LiveBehavior::Healthy));
    let (app, _) = common::create_test_app_with_live(Some(live));
    let (status, json) = common::get_json(&app, "/api/v1/remote/dashboard?days=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["days"], 7);

    // The scripted backend has no activity feed.
    let (status, _) = common::get_json(&app, "/api/v1/remote/activity?max=10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_puzzle_counters() {
    let app = common::create_test_app();
    let _ = common::get_json(&app, "/api/v1/puzzles/next").await;

    let (status, body) = common::get_json(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("puzzle_fetches_total"));
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn test_invalid_slot_names_are_rejected() {
    let app = common::create_test_app();
    let too_long = "s".repeat(33);

    for uri in [
        "/api/v1/puzzles/next?slot=bad%20name".to_string(),
        "/api/v1/puzzles/OFF01?slot=%3Cscript%3E".to_string(),
        format!("/api/v1/puzzles/daily?slot={}", too_long),
        format!("/api/v1/slots/{}", too_long),
    ] {
        let (status, json) = common::get_json(&app, &uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(json["error"].as_str().unwrap().contains("slot"));
    }

    let (status, _) = common::get_json(&app, "/api/v1/puzzles/next?slot=side_2").await;
    assert_eq!(status, StatusCode::OK);
}
