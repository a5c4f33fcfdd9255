use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::lending::CopyHoldings;
use crate::domain::Isbn;

/// 会員×書籍を指定するリクエスト（希望・貸出・返却）
#[derive(Debug, Deserialize)]
pub struct LendingRequest {
    pub member_id: Uuid,
    pub isbn: String,
}

impl LendingRequest {
    pub fn isbn(&self) -> Isbn {
        Isbn::new(self.isbn.as_str())
    }
}

/// 返却期限延長リクエスト
#[derive(Debug, Deserialize)]
pub struct PostponeRequest {
    pub member_id: Uuid,
    pub isbn: String,
    pub days: u32,
}

/// 論理時計を進めるリクエスト（省略時は1日）
#[derive(Debug, Default, Deserialize)]
pub struct AdvanceClockRequest {
    #[serde(default = "one_day")]
    pub days: u32,
}

fn one_day() -> u32 {
    1
}

/// 書籍一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// 著者のフルネームの部分一致で絞り込む
    pub author: Option<String>,
}

/// 在庫レスポンス（GET /books/:isbn/availability）
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub isbn: Isbn,
    pub total: u32,
    pub available: u32,
    pub offered: u32,
    pub borrowed: u32,
    pub queued: usize,
}

impl AvailabilityResponse {
    pub fn new(isbn: Isbn, holdings: CopyHoldings, queued: usize) -> Self {
        Self {
            isbn,
            total: holdings.total,
            available: holdings.available,
            offered: holdings.offered,
            borrowed: holdings.borrowed,
            queued,
        }
    }
}

/// 返却レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookReturnedResponse {
    pub isbn: Isbn,
    pub ban_cleared: bool,
    pub message: String,
}

/// 延長レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct DueDatePostponedResponse {
    pub isbn: Isbn,
    pub due_on: NaiveDate,
}

/// 待ち順レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct QueuePositionResponse {
    pub isbn: Isbn,
    pub member_id: Uuid,
    pub position: usize,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
