mod common;

use std::time::{Duration, Instant};

use serde_json::json;
use training_client::cli::render;
use training_client::error::AppError;
use training_client::models::{ProgramId, ProgramStatus, UserId};
use training_client::services::notice::ALREADY_ENROLLED_NOTICE;
use training_client::services::{
    EnrollOutcome, NOTICE_TTL, Notice, NoticeBoard, NoticeKind, ProgramsService,
};

use common::{StubBackend, http_api, reply, spawn_backend};

fn user() -> UserId {
    UserId::new("2")
}

fn two_programs() -> serde_json::Value {
    json!([
        { "id": 1, "name": "Rust Basics", "price": 100, "status": "ACTIVE" },
        { "id": 2, "name": "Async Rust", "price": "250", "status": "active" }
    ])
}

#[tokio::test]
async fn test_load_normalizes_available_programs() {
    let stub = StubBackend::new();
    stub.reply(
        "available",
        200,
        json!([
            { "programId": 1, "title": "Rust Basics" },
            { "trainingId": 2, "name": "Async Rust", "status": "enrolled" },
            { "id": 3, "name": "Unsafe", "status": "Active " }
        ]),
    );
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);

    let count = service.load(&user()).await.expect("Failed to load programs");

    assert_eq!(count, 3);
    assert_eq!(stub.calls()[0].path, "/api/user/available-programs/2");
    // Only the exact uppercase ACTIVE status survives the filter.
    let active: Vec<ProgramId> = service
        .active_programs()
        .await
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(active, vec![ProgramId::Int(1)]);
    assert_eq!(stub.routes_called(), vec!["available"]);
}

#[tokio::test]
async fn test_empty_available_list_falls_back_to_all_trainings() {
    let stub = StubBackend::new();
    stub.reply("available", 200, json!([]));
    stub.reply("training", 200, two_programs());
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);

    let count = service.load(&user()).await.expect("Failed to load programs");

    assert_eq!(count, 2);
    assert_eq!(stub.routes_called(), vec!["available", "training"]);
}

#[tokio::test]
async fn test_failed_available_list_falls_back_to_all_trainings() {
    let stub = StubBackend::new();
    stub.reply("available", 500, json!({ "message": "Server error" }));
    stub.reply("training", 200, two_programs());
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);

    let count = service.load(&user()).await.expect("Failed to load programs");

    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_fallback_can_be_switched_off() {
    let stub = StubBackend::new();
    stub.reply("available", 200, json!([]));
    stub.reply("training", 200, two_programs());
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), false);

    let count = service.load(&user()).await.expect("Failed to load programs");

    assert_eq!(count, 0);
    assert_eq!(stub.routes_called(), vec!["available"]);
}

#[tokio::test]
async fn test_total_failure_keeps_previous_catalog() {
    let stub = StubBackend::new();
    stub.replies(
        "available",
        vec![
            reply(200, two_programs()),
            reply(500, json!({ "message": "Server error" })),
        ],
    );
    stub.reply("training", 503, json!({ "message": "Unavailable" }));
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);

    service.load(&user()).await.expect("First load should succeed");
    let second = service.load(&user()).await;

    assert!(matches!(second, Err(AppError::Status { .. })));
    assert_eq!(service.programs().await.len(), 2);
}

#[tokio::test]
async fn test_successful_enroll_marks_program_and_refreshes() {
    let stub = StubBackend::new();
    stub.replies(
        "available",
        vec![
            reply(200, two_programs()),
            reply(
                200,
                json!([
                    { "id": 1, "name": "Rust Basics", "status": "ENROLLED" },
                    { "id": 2, "name": "Async Rust", "status": "ACTIVE" }
                ]),
            ),
        ],
    );
    stub.reply(
        "enroll:body",
        200,
        json!({ "success": true, "message": "User enrolled successfully" }),
    );
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);
    service.load(&user()).await.expect("Failed to load programs");

    let report = service
        .enroll(&user(), ProgramId::parse("1"))
        .await
        .expect("Enroll should produce a report");

    assert_eq!(
        report.reconciliation.outcome,
        EnrollOutcome::Success("User enrolled successfully".to_string())
    );
    assert_eq!(report.notice.kind, NoticeKind::Success);

    let refresh = report.refresh.expect("Success should start a refresh");
    let reloaded = refresh
        .await
        .expect("Refresh task panicked")
        .expect("Refresh failed");
    assert_eq!(reloaded, 2);

    let active: Vec<ProgramId> = service
        .active_programs()
        .await
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(active, vec![ProgramId::Int(2)]);
    assert_eq!(
        stub.routes_called(),
        vec!["available", "enroll:body", "available"]
    );
}

#[tokio::test]
async fn test_already_enrolled_marks_program_without_refresh() {
    let stub = StubBackend::new();
    stub.reply("available", 200, two_programs());
    stub.reply(
        "enroll:body",
        400,
        json!({ "success": false, "message": "Already enrolled" }),
    );
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);
    service.load(&user()).await.expect("Failed to load programs");

    let report = service
        .enroll(&user(), ProgramId::Int(2))
        .await
        .expect("Enroll should produce a report");

    assert_eq!(report.reconciliation.outcome, EnrollOutcome::AlreadyEnrolled);
    assert!(report.refresh.is_none());
    assert_eq!(report.notice.kind, NoticeKind::Info);
    assert_eq!(report.notice.text, ALREADY_ENROLLED_NOTICE);

    let programs = service.programs().await;
    assert_eq!(programs[1].status, ProgramStatus::Enrolled);
    assert_eq!(programs[0].status, ProgramStatus::Active);
    // No path or legacy attempt, no reload.
    assert_eq!(stub.routes_called(), vec!["available", "enroll:body"]);
}

#[tokio::test]
async fn test_validation_error_leaves_catalog_alone() {
    let stub = StubBackend::new();
    stub.reply("available", 200, two_programs());
    stub.reply("enroll:body", 400, json!({ "message": "Program is full" }));
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);
    service.load(&user()).await.expect("Failed to load programs");

    let report = service
        .enroll(&user(), ProgramId::Int(1))
        .await
        .expect("Enroll should produce a report");

    assert_eq!(report.notice.kind, NoticeKind::Error);
    assert_eq!(report.notice.text, "Program is full");
    assert!(report.refresh.is_none());
    assert_eq!(service.active_programs().await.len(), 2);
}

#[tokio::test]
async fn test_active_view_reports_when_nothing_is_left() {
    let stub = StubBackend::new();
    stub.reply(
        "available",
        200,
        json!([{ "id": 1, "name": "Rust Basics", "status": "ENROLLED" }]),
    );
    let url = spawn_backend(stub).await;
    let service = ProgramsService::new(http_api(&url), true);
    service.load(&user()).await.expect("Failed to load programs");

    let out = render::active_programs(&service.programs().await);

    assert_eq!(out, "No active programs available");
}

#[test]
fn test_notice_expires_after_ttl() {
    let posted = Instant::now();
    let notice = Notice::new(NoticeKind::Success, "Enrolled successfully", posted);

    assert!(notice.is_visible_at(posted));
    assert!(notice.is_visible_at(posted + NOTICE_TTL - Duration::from_millis(1)));
    assert!(!notice.is_visible_at(posted + NOTICE_TTL));

    let mut board = NoticeBoard::default();
    board.post(notice);
    assert!(board.visible(posted + Duration::from_secs(1)).is_some());
    assert!(board.visible(posted + Duration::from_secs(4)).is_none());
    // Once dropped it stays gone.
    assert!(board.visible(posted).is_none());
}

#[test]
fn test_failed_outcomes_expire_like_successes() {
    let posted = Instant::now();
    let notice = Notice::for_outcome(
        &EnrollOutcome::TransportError("Failed to enroll".to_string()),
        posted,
    );

    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(!notice.is_visible_at(posted + NOTICE_TTL));
}

#[tokio::test]
async fn test_typed_id_matches_string_ids_from_backend() {
    let stub = StubBackend::new();
    stub.reply(
        "available",
        200,
        json!([
            { "id": "7", "name": "Rust Basics" },
            { "id": "8", "name": "Async Rust" }
        ]),
    );
    stub.reply(
        "enroll:body",
        400,
        json!({ "success": false, "message": "Already enrolled" }),
    );
    let url = spawn_backend(stub.clone()).await;
    let service = ProgramsService::new(http_api(&url), true);
    service.load(&user()).await.expect("Failed to load programs");

    let report = service
        .enroll(&user(), ProgramId::parse("7"))
        .await
        .expect("Enroll should produce a report");

    assert_eq!(report.reconciliation.outcome, EnrollOutcome::AlreadyEnrolled);
    let statuses: Vec<ProgramStatus> = service
        .programs()
        .await
        .into_iter()
        .map(|p| p.status)
        .collect();
    assert_eq!(statuses, vec![ProgramStatus::Enrolled, ProgramStatus::Active]);
    // The request carries the backend's own id form.
    assert_eq!(stub.calls()[1].body, json!({ "userId": "2", "trainingId": "7" }));
}

#[test]
fn test_catalog_lookup_ignores_id_representation() {
    use training_client::models::Program;
    use training_client::services::ProgramCatalog;

    let program = |id: ProgramId| Program {
        id,
        name: "p".to_string(),
        description: "d".to_string(),
        price: 0.0,
        status: ProgramStatus::Active,
    };
    let mut catalog = ProgramCatalog::new(vec![
        program(ProgramId::Text("7".to_string())),
        program(ProgramId::Int(8)),
    ]);

    assert_eq!(
        catalog.resolve(&ProgramId::Int(7)),
        ProgramId::Text("7".to_string())
    );
    assert_eq!(catalog.resolve(&ProgramId::Text("8".to_string())), ProgramId::Int(8));
    assert_eq!(catalog.resolve(&ProgramId::Int(9)), ProgramId::Int(9));
    assert!(catalog.find(" 8 ").is_some());

    assert!(catalog.mark_enrolled(&ProgramId::Int(7)));
    assert!(!catalog.mark_enrolled(&ProgramId::Int(9)));
    assert_eq!(catalog.active().count(), 1);
}
