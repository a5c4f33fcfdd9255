use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Isbn, LoanBecameOverdue, MemberId, OfferExpired, RequestPromoted};

/// 貸出希望の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// 在庫があり取り置きされた。`expires_on` までに借りる必要がある
    Offered { isbn: Isbn, expires_on: NaiveDate },
    /// 在庫がなく予約待ちに並んだ
    Queued {
        isbn: Isbn,
        position: usize,
        /// 予測値であり保証ではない
        estimated_available_on: NaiveDate,
    },
}

/// 貸出開始の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanStarted {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
}

/// 返却の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnOutcome {
    pub isbn: Isbn,
    /// この返却で延滞ペナルティが解除されたか
    pub ban_cleared: bool,
}

/// 1タイトルの冊数の内訳
///
/// 保存則：`available + offered + borrowed == total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyHoldings {
    pub total: u32,
    pub available: u32,
    pub offered: u32,
    pub borrowed: u32,
}

impl CopyHoldings {
    pub fn is_conserved(&self) -> bool {
        self.available + self.offered + self.borrowed == self.total
    }
}

/// 日次照合（advance_day）の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub today: NaiveDate,
    /// フェーズ1：新たに貸出禁止になった延滞
    pub banned: Vec<LoanBecameOverdue>,
    /// フェーズ2：失効して在庫に戻った取り置き
    pub expired: Vec<OfferExpired>,
    /// フェーズ3：取り置きに繰り上がった予約
    pub promoted: Vec<RequestPromoted>,
}

impl ReconciliationReport {
    pub fn is_empty(&self) -> bool {
        self.banned.is_empty() && self.expired.is_empty() && self.promoted.is_empty()
    }
}
