use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{
    BanRegistry, Book, BookBorrowed, BookCatalog, BookReturned, CatalogError, DueDatePostponed,
    Isbn, LendingEvent, LendingPolicy, Loan, LoanLedger, LogicalClock, MemberId, Offer,
    OfferGranted, OfferLedger, RequestQueue, RequestQueued,
};
use crate::ports::BorrowingHistory;

use super::errors::{LendingError, Result};
use super::outcomes::{CopyHoldings, LoanStarted, RequestOutcome, ReturnOutcome};

/// 貸出コーディネーター
///
/// カタログと4つの台帳（予約待ち・取り置き・貸出・貸出禁止）をまとめて所有し、
/// 公開操作（希望・貸出・返却・延長・日次照合）を状態機械として提供する。
///
/// 会員×ISBNごとの状態：`NONE → REQUESTED → OFFERED → BORROWED → NONE`。
/// 貸出禁止はこれと直交するフラグ。
///
/// 単一スレッドで1操作ずつ完了させる前提。並行に呼ぶ場合は
/// コーディネーター全体を1つの排他境界（`Mutex`など）で包むこと。
pub struct LendingCoordinator {
    pub(super) catalog: BookCatalog,
    pub(super) requests: RequestQueue,
    pub(super) offers: OfferLedger,
    pub(super) loans: LoanLedger,
    pub(super) bans: BanRegistry,
    pub(super) clock: LogicalClock,
    pub(super) policy: LendingPolicy,
    pub(super) history: Arc<dyn BorrowingHistory>,
    pub(super) journal: Vec<LendingEvent>,
}

impl LendingCoordinator {
    /// 既定の貸出ポリシーでコーディネーターを作る
    pub fn new(start_date: NaiveDate, history: Arc<dyn BorrowingHistory>) -> Self {
        Self::with_policy(start_date, LendingPolicy::default(), history)
    }

    pub fn with_policy(
        start_date: NaiveDate,
        policy: LendingPolicy,
        history: Arc<dyn BorrowingHistory>,
    ) -> Self {
        Self {
            catalog: BookCatalog::new(),
            requests: RequestQueue::new(),
            offers: OfferLedger::with_policy(policy),
            loans: LoanLedger::with_policy(policy),
            bans: BanRegistry::new(),
            clock: LogicalClock::starting_at(start_date),
            policy,
            history,
            journal: Vec::new(),
        }
    }

    // ========================================================================
    // カタログ
    // ========================================================================

    /// 検証済みの書籍をカタログに登録する
    pub fn add_book(&mut self, book: Book) -> Result<()> {
        let isbn = book.isbn.clone();
        self.catalog
            .add_book(book)
            .map_err(|e| self.surface(e))?;
        info!(isbn = %isbn, "Book added to catalog");
        Ok(())
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    pub fn book(&self, isbn: &Isbn) -> Result<&Book> {
        Ok(self.catalog.get(isbn)?)
    }

    // ========================================================================
    // 公開操作
    // ========================================================================

    /// 書籍の貸出を希望する
    ///
    /// ビジネスルール：
    /// - 紙の本であること
    /// - そのISBNで貸出禁止中でないこと
    /// - 既に借りている・取り置き済みでないこと
    /// - 在庫があれば取り置き（3日間）、なければ予約待ちの末尾に並ぶ
    /// - 既に並んでいる会員の再希望は何もせず現在の待ち順を返す
    pub fn request_book(&mut self, member_id: MemberId, isbn: &Isbn) -> Result<RequestOutcome> {
        let today = self.today();
        let (_, available) = self.physical_counts(isbn)?;

        if self.bans.is_banned(member_id, isbn) {
            return Err(LendingError::UserBanned(isbn.clone()));
        }
        if self.loans.find(member_id, isbn).is_ok() {
            return Err(LendingError::AlreadyBorrowed(isbn.clone()));
        }
        if self.offers.find(member_id, isbn).is_some() {
            return Err(LendingError::DuplicateOffer(isbn.clone()));
        }
        if let Ok(position) = self.requests.position_of(member_id, isbn) {
            return Ok(self.queued(isbn, position));
        }

        if available > 0 {
            self.take_copy(isbn)?;
            let offer = match self.offers.create_offer(member_id, isbn, today).cloned() {
                Ok(offer) => offer,
                Err(e) => {
                    self.release_copy(isbn)?;
                    return Err(LendingError::from_offer(e, isbn));
                }
            };

            info!(
                member_id = %member_id,
                isbn = %isbn,
                expires_on = %offer.expires_on,
                "Copy available, offer granted"
            );
            self.journal.push(LendingEvent::OfferGranted(OfferGranted {
                member_id,
                isbn: isbn.clone(),
                offered_on: offer.offered_on,
                expires_on: offer.expires_on,
            }));

            return Ok(RequestOutcome::Offered {
                isbn: isbn.clone(),
                expires_on: offer.expires_on,
            });
        }

        let position = self.requests.enqueue(member_id, isbn);
        info!(
            member_id = %member_id,
            isbn = %isbn,
            position,
            "No copy available, request queued"
        );
        self.journal.push(LendingEvent::RequestQueued(RequestQueued {
            member_id,
            isbn: isbn.clone(),
            position,
            requested_on: today,
        }));

        Ok(self.queued(isbn, position))
    }

    /// 取り置きを受け取って貸出を開始する
    ///
    /// ビジネスルール：
    /// - そのISBNで貸出禁止中でないこと
    /// - 有効な取り置きがあること
    /// - 貸出期間は今日から14日間
    /// - 利用履歴への記録はベストエフォート（失敗しても貸出は取り消さない）
    pub fn borrow_book(&mut self, member_id: MemberId, isbn: &Isbn) -> Result<LoanStarted> {
        let today = self.today();
        let book = self.catalog.get(isbn)?.clone();

        if self.bans.is_banned(member_id, isbn) {
            return Err(LendingError::UserBanned(isbn.clone()));
        }
        if self.loans.find(member_id, isbn).is_ok() {
            return Err(LendingError::AlreadyBorrowed(isbn.clone()));
        }

        let offer = self
            .offers
            .claim(member_id, isbn)
            .map_err(|e| LendingError::from_offer(e, isbn))?;

        let loan = match self.loans.create_loan(member_id, isbn, today).cloned() {
            Ok(loan) => loan,
            Err(e) => {
                if self.offers.reinstate(offer).is_err() {
                    error!(
                        member_id = %member_id,
                        isbn = %isbn,
                        "Failed to reinstate claimed offer"
                    );
                }
                return Err(LendingError::from_loan(e, isbn));
            }
        };

        if let Err(e) = self.history.record_use(member_id, &book) {
            warn!(
                member_id = %member_id,
                isbn = %isbn,
                error = %e,
                "Failed to record borrowing history"
            );
        }

        info!(
            member_id = %member_id,
            isbn = %isbn,
            due_on = %loan.due_on,
            "Loan started"
        );
        self.journal.push(LendingEvent::BookBorrowed(BookBorrowed {
            member_id,
            isbn: isbn.clone(),
            borrowed_on: loan.borrowed_on,
            due_on: loan.due_on,
        }));

        Ok(LoanStarted {
            member_id,
            isbn: isbn.clone(),
            borrowed_on: loan.borrowed_on,
            due_on: loan.due_on,
        })
    }

    /// 書籍を返却する
    ///
    /// ビジネスルール：
    /// - 有効な貸出があること
    /// - 延滞していても返却は受け付ける
    /// - そのISBNに紐づく貸出禁止は解除される
    pub fn return_book(&mut self, member_id: MemberId, isbn: &Isbn) -> Result<ReturnOutcome> {
        let today = self.today();
        self.loans
            .find(member_id, isbn)
            .map_err(|e| LendingError::from_loan(e, isbn))?;

        self.release_copy(isbn)?;
        self.loans
            .remove(member_id, isbn)
            .map_err(|e| LendingError::from_loan(e, isbn))?;
        let ban_cleared = self.bans.clear(member_id, isbn);

        if ban_cleared {
            info!(
                member_id = %member_id,
                isbn = %isbn,
                "Overdue book returned, ban cleared"
            );
        } else {
            info!(member_id = %member_id, isbn = %isbn, "Book returned");
        }
        self.journal.push(LendingEvent::BookReturned(BookReturned {
            member_id,
            isbn: isbn.clone(),
            returned_on: today,
            ban_cleared,
        }));

        Ok(ReturnOutcome {
            isbn: isbn.clone(),
            ban_cleared,
        })
    }

    /// 返却期限を `days` 日延長し、新しい返却期限を返す
    ///
    /// ビジネスルール：
    /// - 有効な貸出があること
    /// - 返却期限は貸出日 + 28日を超えない（刻み幅・回数に依らない）
    pub fn postpone_due_date(
        &mut self,
        member_id: MemberId,
        isbn: &Isbn,
        days: u32,
    ) -> Result<NaiveDate> {
        let old_due_on = self
            .loans
            .find(member_id, isbn)
            .map_err(|e| LendingError::from_loan(e, isbn))?
            .due_on;

        let new_due_on = self
            .loans
            .extend(member_id, isbn, days)
            .map_err(|e| LendingError::from_loan(e, isbn))?;

        if new_due_on != old_due_on {
            let extensions_used = self
                .loans
                .find(member_id, isbn)
                .map(|loan| loan.extensions_used)
                .unwrap_or_default();
            info!(
                member_id = %member_id,
                isbn = %isbn,
                new_due_on = %new_due_on,
                "Due date postponed"
            );
            self.journal
                .push(LendingEvent::DueDatePostponed(DueDatePostponed {
                    member_id,
                    isbn: isbn.clone(),
                    old_due_on,
                    new_due_on,
                    extensions_used,
                }));
        }

        Ok(new_due_on)
    }

    // ========================================================================
    // 参照
    // ========================================================================

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    /// 現在の在庫数
    pub fn copies_available(&self, isbn: &Isbn) -> Result<u32> {
        Ok(self.physical_counts(isbn)?.1)
    }

    /// 予約待ちの1始まりの順番
    pub fn queue_position(&self, member_id: MemberId, isbn: &Isbn) -> Result<usize> {
        self.requests
            .position_of(member_id, isbn)
            .map_err(|e| LendingError::from_queue(e, isbn))
    }

    pub fn queue_length(&self, isbn: &Isbn) -> usize {
        self.requests.len(isbn)
    }

    pub fn is_banned(&self, member_id: MemberId, isbn: &Isbn) -> bool {
        self.bans.is_banned(member_id, isbn)
    }

    /// 冊数の内訳（保存則の確認用）
    pub fn holdings(&self, isbn: &Isbn) -> Result<CopyHoldings> {
        let (total, available) = self.physical_counts(isbn)?;
        Ok(CopyHoldings {
            total,
            available,
            offered: self.offers.count_for(isbn) as u32,
            borrowed: self.loans.count_for(isbn) as u32,
        })
    }

    pub fn offers_for(&self, member_id: MemberId) -> Vec<Offer> {
        self.offers.offers_for(member_id).cloned().collect()
    }

    pub fn loans_for(&self, member_id: MemberId) -> Vec<Loan> {
        self.loans.loans_for(member_id).cloned().collect()
    }

    /// 発生したドメインイベント（時系列順）
    pub fn events(&self) -> &[LendingEvent] {
        &self.journal
    }

    // ========================================================================
    // 内部ヘルパー
    // ========================================================================

    fn queued(&self, isbn: &Isbn, position: usize) -> RequestOutcome {
        RequestOutcome::Queued {
            isbn: isbn.clone(),
            position,
            estimated_available_on: self.policy.estimated_availability(self.today(), position),
        }
    }

    fn physical_counts(&self, isbn: &Isbn) -> Result<(u32, u32)> {
        self.catalog
            .physical_counts(isbn)
            .map_err(|e| self.surface(e))
    }

    /// 在庫から1冊持ち出す
    pub(super) fn take_copy(&mut self, isbn: &Isbn) -> Result<u32> {
        self.catalog
            .decrement_available(isbn)
            .map_err(|e| self.surface(e))
    }

    /// 在庫に1冊戻す
    pub(super) fn release_copy(&mut self, isbn: &Isbn) -> Result<u32> {
        self.catalog
            .increment_available(isbn)
            .map_err(|e| self.surface(e))
    }

    /// カタログエラーを変換する。不変条件違反はここで記録する
    fn surface(&self, err: CatalogError) -> LendingError {
        log_invariant_violation(&err);
        err.into()
    }
}

/// 台帳同士のずれを示すエラーを error レベルで記録する
pub(super) fn log_invariant_violation(err: &CatalogError) {
    if let CatalogError::InvariantViolation { isbn, detail } = err {
        error!(isbn = %isbn, detail = %detail, "Ledger invariant violated");
    }
}
