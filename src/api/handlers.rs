use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::adapters::in_memory::MemberRegistry;
use crate::application::lending::{
    LendingCoordinator, LoanStarted, ReconciliationReport, RequestOutcome,
};
use crate::application::registration::{NewDigitalBook, NewMember, NewPaperBook};
use crate::domain::{Book, Isbn, Member, MemberId};

use super::{
    error::ApiError,
    types::{
        AdvanceClockRequest, AvailabilityResponse, BookReturnedResponse,
        DueDatePostponedResponse, LendingRequest, ListBooksQuery, PostponeRequest,
        QueuePositionResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
///
/// コーディネーターは1つの `Mutex` の内側にあり、各ハンドラーは1回だけロックし、
/// ロック中に `.await` しない。そのため照合（advance_day）は他の操作と交錯しない。
pub struct AppState {
    coordinator: Mutex<LendingCoordinator>,
    pub members: Arc<MemberRegistry>,
}

impl AppState {
    pub fn new(coordinator: LendingCoordinator, members: Arc<MemberRegistry>) -> Self {
        Self {
            coordinator: Mutex::new(coordinator),
            members,
        }
    }

    pub fn coordinator(&self) -> MutexGuard<'_, LendingCoordinator> {
        self.coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn registered_member(&self, member_id: Uuid) -> Result<MemberId, ApiError> {
        let member_id = MemberId::from_uuid(member_id);
        if self.members.contains(member_id) {
            Ok(member_id)
        } else {
            Err(ApiError::UnknownMember(member_id.value()))
        }
    }
}

// ============================================================================
// Catalog handlers
// ============================================================================

/// POST /books/paper - 紙の本を登録
pub async fn add_paper_book(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewPaperBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let mut coordinator = state.coordinator();
    let book = form.validate(coordinator.catalog())?;
    coordinator.add_book(book.clone())?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// POST /books/digital - 電子書籍を登録
pub async fn add_digital_book(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewDigitalBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let mut coordinator = state.coordinator();
    let book = form.validate(coordinator.catalog())?;
    coordinator.add_book(book.clone())?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books - 登録順の書籍一覧（`?author=` で著者名検索）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Json<Vec<Book>> {
    let coordinator = state.coordinator();
    let catalog = coordinator.catalog();

    let books: Vec<Book> = match query.author {
        Some(author) => catalog
            .search_by_author_full_name(&author)
            .into_iter()
            .cloned()
            .collect(),
        None => catalog.list_all().to_vec(),
    };
    Json(books)
}

/// GET /books/:isbn/availability - 冊数の内訳と待ち人数
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let isbn = Isbn::new(isbn);
    let coordinator = state.coordinator();
    let holdings = coordinator.holdings(&isbn)?;
    let queued = coordinator.queue_length(&isbn);

    Ok(Json(AvailabilityResponse::new(isbn, holdings, queued)))
}

// ============================================================================
// Member handlers
// ============================================================================

/// POST /members - 会員登録
pub async fn register_member(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewMember>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    // ユーザー名の重複の最終判定は register が同じロックの中で行う
    let member = form.validate(|username| state.members.is_username_taken(username))?;
    state.members.register(member.clone())?;
    tracing::info!(
        member_id = %member.member_id,
        username = %member.username,
        "Member registered"
    );

    Ok((StatusCode::CREATED, Json(member)))
}

// ============================================================================
// Lending handlers
// ============================================================================

/// POST /lending/request - 貸出を希望
///
/// 在庫があれば取り置き（`status: offered`）、なければ予約待ち（`status: queued`）。
pub async fn request_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LendingRequest>,
) -> Result<Json<RequestOutcome>, ApiError> {
    let member_id = state.registered_member(req.member_id)?;
    let outcome = state.coordinator().request_book(member_id, &req.isbn())?;

    Ok(Json(outcome))
}

/// POST /lending/borrow - 取り置きを受け取って借りる
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LendingRequest>,
) -> Result<(StatusCode, Json<LoanStarted>), ApiError> {
    let member_id = state.registered_member(req.member_id)?;
    let loan = state.coordinator().borrow_book(member_id, &req.isbn())?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// POST /lending/return - 返却
///
/// 延滞中の返却も受け付け、その書籍の貸出禁止を解除する。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LendingRequest>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let member_id = state.registered_member(req.member_id)?;
    let outcome = state.coordinator().return_book(member_id, &req.isbn())?;

    let message = if outcome.ban_cleared {
        format!("{} returned late. The ban for this book has been lifted.", outcome.isbn)
    } else {
        format!("{} returned. Thank you!", outcome.isbn)
    };
    Ok(Json(BookReturnedResponse {
        isbn: outcome.isbn,
        ban_cleared: outcome.ban_cleared,
        message,
    }))
}

/// POST /lending/postpone - 返却期限を延長
pub async fn postpone_due_date(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PostponeRequest>,
) -> Result<Json<DueDatePostponedResponse>, ApiError> {
    let member_id = state.registered_member(req.member_id)?;
    let isbn = Isbn::new(req.isbn);
    let due_on = state
        .coordinator()
        .postpone_due_date(member_id, &isbn, req.days)?;

    Ok(Json(DueDatePostponedResponse { isbn, due_on }))
}

/// GET /lending/queue/:isbn/:member_id - 予約待ちの順番
pub async fn get_queue_position(
    State(state): State<Arc<AppState>>,
    Path((isbn, member_id)): Path<(String, Uuid)>,
) -> Result<Json<QueuePositionResponse>, ApiError> {
    let isbn = Isbn::new(isbn);
    let position = state
        .coordinator()
        .queue_position(MemberId::from_uuid(member_id), &isbn)?;

    Ok(Json(QueuePositionResponse {
        isbn,
        member_id,
        position,
    }))
}

// ============================================================================
// Clock handlers
// ============================================================================

/// POST /clock/advance - 論理時計を進めて台帳を照合
pub async fn advance_clock(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdvanceClockRequest>,
) -> Result<Json<ReconciliationReport>, ApiError> {
    let report = state.coordinator().advance_day(req.days)?;

    Ok(Json(report))
}
