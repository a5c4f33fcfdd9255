use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{CatalogError, ClockError, Isbn, LoanError, OfferError, QueueError};

/// 貸出管理アプリケーション層のエラー
///
/// どれも呼び出し側で回復可能。`InvariantViolation` だけは台帳同士のずれを示す
/// 内部不整合で、検出時に error レベルで記録される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    /// 書籍が存在しない
    #[error("Book with ISBN {0} not found")]
    BookNotFound(Isbn),

    /// 紙の本ではない
    #[error("Book with ISBN {0} is not a physical book")]
    NotPhysical(Isbn),

    /// ISBNが重複している
    #[error("Book with ISBN {0} already exists")]
    DuplicateIsbn(Isbn),

    /// 在庫数の不変条件違反
    #[error("Copy count invariant violated for {isbn}: {detail}")]
    InvariantViolation { isbn: Isbn, detail: String },

    /// 延滞中のため貸出禁止
    #[error("Member is banned from {0} until the overdue copy is returned")]
    UserBanned(Isbn),

    /// 受け取れる取り置きがない
    #[error("No offer for {0} is waiting for this member")]
    NoOfferFound(Isbn),

    /// 有効な貸出がない
    #[error("Member has no active loan for {0}")]
    NoActiveLoan(Isbn),

    /// 延長上限を超えた
    #[error("Due date cannot be postponed beyond {latest_due_date}")]
    ExtensionLimitExceeded { latest_due_date: NaiveDate },

    /// 予約待ちに並んでいない
    #[error("Member is not queued for {0}")]
    NotQueued(Isbn),

    /// 取り置きが既にある
    #[error("An offer for {0} is already waiting for this member")]
    DuplicateOffer(Isbn),

    /// 同じ書籍を既に借りている
    #[error("Member already has {0} on loan")]
    AlreadyBorrowed(Isbn),

    /// 日付の計算が暦の範囲を外れる
    #[error("{from} + {days} days is out of the supported date range")]
    DateOutOfRange { from: NaiveDate, days: u64 },
}

impl LendingError {
    pub(super) fn from_queue(err: QueueError, isbn: &Isbn) -> Self {
        match err {
            QueueError::NotQueued | QueueError::Empty => LendingError::NotQueued(isbn.clone()),
        }
    }

    pub(super) fn from_offer(err: OfferError, isbn: &Isbn) -> Self {
        match err {
            OfferError::DuplicateOffer => LendingError::DuplicateOffer(isbn.clone()),
            OfferError::NoSuchOffer => LendingError::NoOfferFound(isbn.clone()),
            OfferError::DateOutOfRange { from, days } => {
                LendingError::DateOutOfRange { from, days }
            }
        }
    }

    pub(super) fn from_loan(err: LoanError, isbn: &Isbn) -> Self {
        match err {
            LoanError::NotBorrowed => LendingError::NoActiveLoan(isbn.clone()),
            LoanError::DuplicateLoan => LendingError::AlreadyBorrowed(isbn.clone()),
            LoanError::ExtensionLimitExceeded { latest_due_date } => {
                LendingError::ExtensionLimitExceeded { latest_due_date }
            }
            LoanError::DateOutOfRange { from, days } => LendingError::DateOutOfRange { from, days },
        }
    }
}

impl From<CatalogError> for LendingError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateIsbn(isbn) => LendingError::DuplicateIsbn(isbn),
            CatalogError::NotFound(isbn) => LendingError::BookNotFound(isbn),
            CatalogError::NotPhysicalBook(isbn) => LendingError::NotPhysical(isbn),
            CatalogError::InvariantViolation { isbn, detail } => {
                LendingError::InvariantViolation { isbn, detail }
            }
        }
    }
}

impl From<ClockError> for LendingError {
    fn from(err: ClockError) -> Self {
        match err {
            ClockError::OutOfRange { today, days } => LendingError::DateOutOfRange {
                from: today,
                days: u64::from(days),
            },
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;
