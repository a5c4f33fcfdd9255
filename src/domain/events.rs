use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Isbn, MemberId};

/// イベント：在庫があり、取り置きが作成された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferGranted {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub offered_on: NaiveDate,
    pub expires_on: NaiveDate,
}

/// イベント：在庫がなく、予約待ちに並んだ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestQueued {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub position: usize,
    pub requested_on: NaiveDate,
}

/// イベント：予約待ちの先頭が取り置きに繰り上がった
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPromoted {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub offered_on: NaiveDate,
    pub expires_on: NaiveDate,
}

/// イベント：取り置きが受け取られずに失効した
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferExpired {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub expired_on: NaiveDate,
}

/// イベント：書籍が貸出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
}

/// イベント：返却期限が延長された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDatePostponed {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub old_due_on: NaiveDate,
    pub new_due_on: NaiveDate,
    pub extensions_used: u32,
}

/// イベント：貸出が延滞し、会員がそのISBNについて貸出禁止になった
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBecameOverdue {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub due_on: NaiveDate,
    pub detected_on: NaiveDate,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub returned_on: NaiveDate,
    pub ban_cleared: bool,
}

/// 貸出ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LendingEvent {
    OfferGranted(OfferGranted),
    RequestQueued(RequestQueued),
    RequestPromoted(RequestPromoted),
    OfferExpired(OfferExpired),
    BookBorrowed(BookBorrowed),
    DueDatePostponed(DueDatePostponed),
    LoanBecameOverdue(LoanBecameOverdue),
    BookReturned(BookReturned),
}
