use chrono::NaiveDate;
use thiserror::Error;

use super::Isbn;

/// カタログ操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// 同じISBNの書籍が既に登録されている
    #[error("Book with ISBN {0} already exists")]
    DuplicateIsbn(Isbn),
    /// ISBNに該当する書籍がない
    #[error("Book with ISBN {0} not found")]
    NotFound(Isbn),
    /// 電子書籍に対して在庫操作をしようとした
    #[error("Book with ISBN {0} is not a physical book")]
    NotPhysicalBook(Isbn),
    /// 在庫数が 0..=total_copies の範囲を外れる
    #[error("Copy count invariant violated for {isbn}: {detail}")]
    InvariantViolation { isbn: Isbn, detail: String },
}

/// 予約待ち行列のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Member is not queued for this book")]
    NotQueued,
    #[error("Nobody is queued for this book")]
    Empty,
}

/// 取り置き台帳のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OfferError {
    #[error("An offer already exists for this member and book")]
    DuplicateOffer,
    #[error("No offer exists for this member and book")]
    NoSuchOffer,
    /// 期限日が暦の範囲を外れる
    #[error("Offer expiry {from} + {days} days is out of range")]
    DateOutOfRange { from: NaiveDate, days: u64 },
}

/// 貸出台帳のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoanError {
    #[error("Member has not borrowed this book")]
    NotBorrowed,
    #[error("Member already has an active loan for this book")]
    DuplicateLoan,
    /// 延長すると返却期限が上限日を超える
    #[error("Due date cannot be postponed beyond {latest_due_date}")]
    ExtensionLimitExceeded { latest_due_date: NaiveDate },
    /// 返却期限が暦の範囲を外れる
    #[error("Due date {from} + {days} days is out of range")]
    DateOutOfRange { from: NaiveDate, days: u64 },
}

/// 論理時計のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("Clock cannot advance {days} days past {today}")]
    OutOfRange { today: NaiveDate, days: u32 },
}
