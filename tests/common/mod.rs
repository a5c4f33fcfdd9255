#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use rusty_library_lending::application::lending::LendingCoordinator;
use rusty_library_lending::domain::{Book, BookFormat, Isbn, MemberId};
use rusty_library_lending::ports::BorrowingHistory;
use rusty_library_lending::ports::borrowing_history::Result;
use std::sync::{Arc, Mutex};

// ============================================================================
// インメモリモック実装（テスト用）
// ============================================================================

/// 記録された利用履歴を保持するモックBorrowingHistory
#[derive(Default)]
pub struct RecordingHistory {
    pub records: Mutex<Vec<(MemberId, Isbn)>>,
}

impl BorrowingHistory for RecordingHistory {
    fn record_use(&self, member_id: MemberId, book: &Book) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .push((member_id, book.isbn.clone()));
        Ok(())
    }
}

/// 常に失敗するモックBorrowingHistory
pub struct FailingHistory;

impl BorrowingHistory for FailingHistory {
    fn record_use(&self, _member_id: MemberId, _book: &Book) -> Result<()> {
        Err("history service unavailable".into())
    }
}

// ============================================================================
// フィクスチャ
// ============================================================================

/// 論理時計の開始日から `n` 日目
pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

pub fn isbn(value: &str) -> Isbn {
    Isbn::from(value)
}

pub fn paper_book(isbn: &str, copies: u32) -> Book {
    Book::paper(Isbn::from(isbn), "Game of thrones", copies)
}

pub fn ebook(isbn: &str) -> Book {
    Book {
        format: BookFormat::Readable {
            online_link: "http://harrypotter.online.read.com".to_string(),
        },
        ..paper_book(isbn, 1)
    }
}

/// day(0) から始まり、指定した紙の本を登録済みのコーディネーター
pub fn coordinator_with(books: &[(&str, u32)]) -> (LendingCoordinator, Arc<RecordingHistory>) {
    let history = Arc::new(RecordingHistory::default());
    let mut coordinator = LendingCoordinator::new(day(0), history.clone());
    for (isbn, copies) in books {
        coordinator.add_book(paper_book(isbn, *copies)).unwrap();
    }
    (coordinator, history)
}

/// 取り置きを受け取るところまで進めて貸出を開始する
pub fn borrow(coordinator: &mut LendingCoordinator, member: MemberId, isbn: &Isbn) {
    coordinator.request_book(member, isbn).unwrap();
    coordinator.borrow_book(member, isbn).unwrap();
}

/// 冊数の保存則を確認する
pub fn assert_conserved(coordinator: &LendingCoordinator, isbn: &Isbn) {
    let holdings = coordinator.holdings(isbn).unwrap();
    assert!(holdings.is_conserved(), "copies not conserved: {:?}", holdings);
}
