use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rusty_library_lending::adapters::in_memory::MemberRegistry;
use rusty_library_lending::api::{
    AppState, AvailabilityResponse, BookReturnedResponse, DueDatePostponedResponse,
    ErrorResponse, QueuePositionResponse, create_router,
};
use rusty_library_lending::application::lending::{
    LendingCoordinator, LoanStarted, ReconciliationReport, RequestOutcome,
};
use rusty_library_lending::domain::{Book, Member};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

use common::day;

// ============================================================================
// テスト用のヘルパー関数
// ============================================================================

/// day(0) から始まるインメモリ構成のルーター
fn setup_app() -> (Router, Arc<MemberRegistry>) {
    let members = Arc::new(MemberRegistry::new());
    let coordinator = LendingCoordinator::new(day(0), members.clone());
    let app_state = Arc::new(AppState::new(coordinator, members.clone()));

    (create_router(app_state), members)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

fn paper_book_json(isbn: &str, copies: u32) -> Value {
    json!({
        "isbn": isbn,
        "title": "Game of thrones",
        "summary": "A story about noble families fighting for the control over the Iron Throne.",
        "authors": [{ "first_name": "George", "last_name": "Martin" }],
        "genres": ["fantasy"],
        "categories": ["story"],
        "total_copies": copies,
    })
}

fn member_json(username: &str) -> Value {
    json!({
        "username": username,
        "password": "secret1",
        "first_name": "Ivan",
        "last_name": "Petrov",
        "age": 30,
        "gender": "m",
        "address": { "country": "Bulgaria", "city": "Sofia", "street": "Vitosha 1" },
        "email": "ivan.petrov@mail.bg",
        "gdpr_consent": true,
    })
}

async fn register_member(app: &Router, username: &str) -> Uuid {
    let (status, body) = send(app, "POST", "/members", Some(member_json(username))).await;
    assert_eq!(status, StatusCode::CREATED);
    parse::<Member>(&body).member_id.value()
}

async fn add_paper_book(app: &Router, isbn: &str, copies: u32) {
    let (status, _) = send(app, "POST", "/books/paper", Some(paper_book_json(isbn, copies))).await;
    assert_eq!(status, StatusCode::CREATED);
}

fn lending(member_id: Uuid, isbn: &str) -> Option<Value> {
    Some(json!({ "member_id": member_id, "isbn": isbn }))
}

// ============================================================================
// E2Eテスト
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_full_lending_workflow() {
    // Arrange
    let (app, members) = setup_app();
    add_paper_book(&app, "1234-5", 1).await;
    let member_id = register_member(&app, "ivan.petrov").await;

    // Step 1: 貸出希望 → 取り置き
    let (status, body) = send(&app, "POST", "/lending/request", lending(member_id, "1234-5")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(matches!(parse::<RequestOutcome>(&body), RequestOutcome::Offered { .. }));

    // Step 2: 受け取り → 貸出開始
    let (status, body) = send(&app, "POST", "/lending/borrow", lending(member_id, "1234-5")).await;
    assert_eq!(status, StatusCode::CREATED);
    let loan: LoanStarted = parse(&body);
    assert_eq!(loan.due_on, day(14));

    // Step 3: 延長
    let postpone = json!({ "member_id": member_id, "isbn": "1234-5", "days": 7 });
    let (status, body) = send(&app, "POST", "/lending/postpone", Some(postpone)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<DueDatePostponedResponse>(&body).due_on, day(21));

    // Step 4: 在庫の内訳
    let (status, body) = send(&app, "GET", "/books/1234-5/availability", None).await;
    assert_eq!(status, StatusCode::OK);
    let availability: AvailabilityResponse = parse(&body);
    assert_eq!((availability.available, availability.borrowed), (0, 1));

    // Step 5: 返却
    let (status, body) = send(&app, "POST", "/lending/return", lending(member_id, "1234-5")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!parse::<BookReturnedResponse>(&body).ban_cleared);

    // 利用履歴が記録されている
    assert_eq!(members.history(loan.member_id).len(), 1);
}

#[tokio::test]
async fn test_queue_and_promotion_through_clock() {
    // Arrange: 1冊の本を2人が希望する
    let (app, _) = setup_app();
    add_paper_book(&app, "1234-5", 1).await;
    let first = register_member(&app, "first.member").await;
    let second = register_member(&app, "second.member").await;
    send(&app, "POST", "/lending/request", lending(first, "1234-5")).await;

    let (_, body) = send(&app, "POST", "/lending/request", lending(second, "1234-5")).await;
    assert_eq!(
        parse::<RequestOutcome>(&body),
        RequestOutcome::Queued {
            isbn: "1234-5".into(),
            position: 1,
            estimated_available_on: day(21),
        }
    );

    let uri = format!("/lending/queue/1234-5/{}", second);
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<QueuePositionResponse>(&body).position, 1);

    // Act: 1人目の取り置きを失効させる
    let (status, body) = send(&app, "POST", "/clock/advance", Some(json!({ "days": 4 }))).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let report: ReconciliationReport = parse(&body);
    assert_eq!(report.today, day(4));
    assert_eq!(report.expired.len(), 1);
    assert_eq!(report.promoted.len(), 1);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "NOT_QUEUED");
}

#[tokio::test]
async fn test_overdue_member_is_banned_until_return() {
    let (app, _) = setup_app();
    add_paper_book(&app, "1234-5", 1).await;
    let member_id = register_member(&app, "ivan.petrov").await;
    send(&app, "POST", "/lending/request", lending(member_id, "1234-5")).await;
    send(&app, "POST", "/lending/borrow", lending(member_id, "1234-5")).await;

    send(&app, "POST", "/clock/advance", Some(json!({ "days": 15 }))).await;
    let (status, body) = send(&app, "POST", "/lending/request", lending(member_id, "1234-5")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "USER_BANNED");

    let (status, body) = send(&app, "POST", "/lending/return", lending(member_id, "1234-5")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(parse::<BookReturnedResponse>(&body).ban_cleared);
}

#[tokio::test]
async fn test_extension_limit_is_unprocessable() {
    let (app, _) = setup_app();
    add_paper_book(&app, "1234-5", 1).await;
    let member_id = register_member(&app, "ivan.petrov").await;
    send(&app, "POST", "/lending/request", lending(member_id, "1234-5")).await;
    send(&app, "POST", "/lending/borrow", lending(member_id, "1234-5")).await;

    let postpone = json!({ "member_id": member_id, "isbn": "1234-5", "days": 15 });
    let (status, body) = send(&app, "POST", "/lending/postpone", Some(postpone)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "EXTENSION_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn test_out_of_range_days_are_typed_errors() {
    let (app, _) = setup_app();
    add_paper_book(&app, "1234-5", 1).await;
    let member_id = register_member(&app, "ivan.petrov").await;
    send(&app, "POST", "/lending/request", lending(member_id, "1234-5")).await;
    send(&app, "POST", "/lending/borrow", lending(member_id, "1234-5")).await;

    let postpone = json!({ "member_id": member_id, "isbn": "1234-5", "days": u32::MAX });
    let (status, body) = send(&app, "POST", "/lending/postpone", Some(postpone)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "EXTENSION_LIMIT_EXCEEDED");

    let advance = json!({ "days": u32::MAX });
    let (status, body) = send(&app, "POST", "/clock/advance", Some(advance)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "DATE_OUT_OF_RANGE");

    // 失敗の後もサービスは使える
    let (status, body) = send(&app, "POST", "/clock/advance", Some(json!({ "days": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<ReconciliationReport>(&body).today, day(1));
}

#[tokio::test]
async fn test_catalog_registration_and_listing() {
    let (app, _) = setup_app();
    add_paper_book(&app, "1234-5", 2).await;

    let ebook = json!({
        "isbn": "1234-6",
        "title": "Harry Potter",
        "summary": "A boy discovers on his eleventh birthday that he is the son of two wizards.",
        "authors": [{ "first_name": "Joan", "last_name": "Rolling" }],
        "genres": ["fantasy"],
        "categories": ["children"],
        "online_link": "http://harrypotter.online.read.com",
    });
    let (status, _) = send(&app, "POST", "/books/digital", Some(ebook)).await;
    assert_eq!(status, StatusCode::CREATED);

    // 重複ISBNは409
    let (status, body) = send(&app, "POST", "/books/paper", Some(paper_book_json("1234-5", 1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse::<ErrorResponse>(&body).error, "DUPLICATE_ISBN");

    let (status, body) = send(&app, "GET", "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    let isbns: Vec<String> = parse::<Vec<Book>>(&body)
        .into_iter()
        .map(|book| book.isbn.to_string())
        .collect();
    assert_eq!(isbns, vec!["1234-5", "1234-6"]);

    let (_, body) = send(&app, "GET", "/books?author=Rolling", None).await;
    assert_eq!(parse::<Vec<Book>>(&body).len(), 1);

    // 電子書籍は貸出対象外
    let (status, body) = send(&app, "GET", "/books/1234-6/availability", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "NOT_PHYSICAL");
}

#[tokio::test]
async fn test_invalid_registrations_are_rejected() {
    let (app, _) = setup_app();

    let mut book = paper_book_json("12345", 1);
    let (status, body) = send(&app, "POST", "/books/paper", Some(book.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "VALIDATION_FAILED");

    book["isbn"] = json!("1234-5");
    book["total_copies"] = json!(0);
    let (status, _) = send(&app, "POST", "/books/paper", Some(book)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    register_member(&app, "ivan.petrov").await;
    let (status, body) = send(&app, "POST", "/members", Some(member_json("ivan.petrov"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse::<ErrorResponse>(&body).error, "USERNAME_TAKEN");
}

#[tokio::test]
async fn test_concurrent_registrations_with_one_username() {
    let (app, members) = setup_app();

    let attempts = (0..8).map(|_| {
        let app = app.clone();
        tokio::spawn(async move {
            send(&app, "POST", "/members", Some(member_json("ivan.petrov"))).await.0
        })
    });
    let mut statuses = Vec::new();
    for attempt in attempts.collect::<Vec<_>>() {
        statuses.push(attempt.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1);
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT));
    assert!(members.find_by_username("ivan.petrov").is_some());
}

#[tokio::test]
async fn test_unknown_member_and_book() {
    let (app, _) = setup_app();
    add_paper_book(&app, "1234-5", 1).await;

    let (status, body) = send(&app, "POST", "/lending/request", lending(Uuid::new_v4(), "1234-5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "MEMBER_NOT_FOUND");

    let member_id = register_member(&app, "ivan.petrov").await;
    let (status, body) = send(&app, "POST", "/lending/request", lending(member_id, "0000-0")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "BOOK_NOT_FOUND");

    let (status, body) = send(&app, "POST", "/lending/borrow", lending(member_id, "1234-5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "NO_OFFER_FOUND");
}
