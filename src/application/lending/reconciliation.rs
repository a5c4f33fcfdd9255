use tracing::{debug, info, warn};

use crate::domain::{Isbn, LendingEvent, LoanBecameOverdue, OfferExpired, RequestPromoted};

use super::coordinator::{LendingCoordinator, log_invariant_violation};
use super::errors::Result;
use super::outcomes::ReconciliationReport;

impl LendingCoordinator {
    /// 論理時計を `days` 日進め、台帳を照合する
    ///
    /// 3つのフェーズを必ずこの順で実行する：
    /// 1. 延滞した貸出の会員をそのISBNについて貸出禁止にする
    /// 2. 受け取り期間を過ぎた取り置きを失効させ、在庫に戻す
    /// 3. 在庫と予約待ちが両方ある限り、先頭の予約を取り置きに繰り上げる
    ///
    /// どのフェーズも既に処理済みの記録には何もしないため、`days == 0` で
    /// 何度呼んでも二重の禁止・失効・繰り上げは起きない。
    ///
    /// # エラー
    /// 進めた日付が暦の範囲を外れる場合は`LendingError::DateOutOfRange`。
    /// このとき時計も台帳も変わらない。
    pub fn advance_day(&mut self, days: u32) -> Result<ReconciliationReport> {
        let today = self.clock.advance(days).inspect_err(|e| {
            warn!(days, error = %e, "Clock advance rejected");
        })?;
        debug!(today = %today, days, "Reconciliation started");

        let banned = self.ban_overdue_loans();
        let expired = self.expire_offers();
        let promoted = self.promote_requests();

        let report = ReconciliationReport {
            today,
            banned,
            expired,
            promoted,
        };
        info!(
            today = %today,
            banned = report.banned.len(),
            expired = report.expired.len(),
            promoted = report.promoted.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    // フェーズ1
    fn ban_overdue_loans(&mut self) -> Vec<LoanBecameOverdue> {
        let today = self.today();
        let mut banned = Vec::new();

        for loan in self.loans.overdue_as_of(today) {
            if !self.bans.ban(loan.member_id, &loan.isbn) {
                continue;
            }
            info!(
                member_id = %loan.member_id,
                isbn = %loan.isbn,
                due_on = %loan.due_on,
                "Loan overdue, member banned"
            );
            banned.push(LoanBecameOverdue {
                member_id: loan.member_id,
                isbn: loan.isbn.clone(),
                due_on: loan.due_on,
                detected_on: today,
            });
        }

        debug!(count = banned.len(), "Phase 1 (ban overdue loans) done");
        self.journal
            .extend(banned.iter().cloned().map(LendingEvent::LoanBecameOverdue));
        banned
    }

    // フェーズ2
    fn expire_offers(&mut self) -> Vec<OfferExpired> {
        let today = self.today();
        let mut expired = Vec::new();

        for offer in self.offers.expire_before(today) {
            if let Err(e) = self.catalog.increment_available(&offer.isbn) {
                log_invariant_violation(&e);
            }
            info!(
                member_id = %offer.member_id,
                isbn = %offer.isbn,
                expires_on = %offer.expires_on,
                "Offer expired, copy returned"
            );
            expired.push(OfferExpired {
                member_id: offer.member_id,
                isbn: offer.isbn,
                expired_on: today,
            });
        }

        debug!(count = expired.len(), "Phase 2 (expire offers) done");
        self.journal
            .extend(expired.iter().cloned().map(LendingEvent::OfferExpired));
        expired
    }

    // フェーズ3（カタログの登録順に走査）
    fn promote_requests(&mut self) -> Vec<RequestPromoted> {
        let today = self.today();
        if self.policy.offer_expiry(today).is_none() {
            // 期限日を表現できない日は繰り上げない（予約は並んだまま）
            warn!(today = %today, "Offer window runs past the calendar, promotion skipped");
            return Vec::new();
        }

        let isbns: Vec<Isbn> = self
            .catalog
            .list_all()
            .iter()
            .filter(|book| book.is_physical())
            .map(|book| book.isbn.clone())
            .collect();

        let mut promoted = Vec::new();
        for isbn in &isbns {
            self.promote_for(isbn, &mut promoted);
        }

        debug!(count = promoted.len(), "Phase 3 (promote requests) done");
        self.journal
            .extend(promoted.iter().cloned().map(LendingEvent::RequestPromoted));
        promoted
    }

    fn promote_for(&mut self, isbn: &Isbn, promoted: &mut Vec<RequestPromoted>) {
        let today = self.today();

        while self.copies_available(isbn).unwrap_or(0) > 0 && !self.requests.is_empty(isbn) {
            let Ok(request) = self.requests.dequeue_head(isbn) else {
                break;
            };

            if self.take_copy(isbn).is_err() {
                break;
            }
            let offer = match self.offers.create_offer(request.member_id, isbn, today).cloned() {
                Ok(offer) => offer,
                Err(e) => {
                    warn!(
                        member_id = %request.member_id,
                        isbn = %isbn,
                        error = %e,
                        "Queued request could not be promoted"
                    );
                    if self.release_copy(isbn).is_err() {
                        break;
                    }
                    continue;
                }
            };

            info!(
                member_id = %request.member_id,
                isbn = %isbn,
                expires_on = %offer.expires_on,
                "Queued request promoted to offer"
            );
            promoted.push(RequestPromoted {
                member_id: request.member_id,
                isbn: isbn.clone(),
                offered_on: offer.offered_on,
                expires_on: offer.expires_on,
            });
        }
    }
}
