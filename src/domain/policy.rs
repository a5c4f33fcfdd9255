use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// 取り置き（Offer）の受け取り期限（日数）
pub const OFFER_WINDOW_DAYS: u64 = 3;

/// 貸出期間（日数）
pub const INITIAL_LOAN_DAYS: u64 = 14;

/// 延長できる日数の累計上限。返却期限は貸出日 + 28日を超えない。
pub const MAX_EXTENSION_DAYS: u64 = 14;

/// 待ち順1つあたりの平均貸出日数（予測日の算出に使う）
pub const AVERAGE_LOAN_DAYS: u64 = 21;

/// 貸出ポリシー
///
/// 期間に関するビジネスルールをまとめた値。
/// 既定値は公立図書館の標準ルール（3日 / 14日 / +14日 / 21日）。
///
/// 日付の計算はすべて checked で、暦の範囲を外れると `None` を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingPolicy {
    pub offer_window_days: u64,
    pub initial_loan_days: u64,
    pub max_extension_days: u64,
    pub average_loan_days: u64,
}

impl LendingPolicy {
    /// 取り置きの期限日
    pub fn offer_expiry(&self, offered_on: NaiveDate) -> Option<NaiveDate> {
        offered_on.checked_add_days(Days::new(self.offer_window_days))
    }

    /// 貸出開始時の返却期限
    pub fn initial_due_date(&self, borrowed_on: NaiveDate) -> Option<NaiveDate> {
        borrowed_on.checked_add_days(Days::new(self.initial_loan_days))
    }

    /// 延長後に許される最も遅い返却期限
    pub fn latest_due_date(&self, borrowed_on: NaiveDate) -> Option<NaiveDate> {
        let span = self
            .initial_loan_days
            .checked_add(self.max_extension_days)?;
        borrowed_on.checked_add_days(Days::new(span))
    }

    /// 待ち順から利用可能日を予測する（保証ではない）
    ///
    /// 暦の範囲を超える場合は表現できる最後の日に丸める。
    pub fn estimated_availability(&self, today: NaiveDate, position: usize) -> NaiveDate {
        (position as u64)
            .checked_mul(self.average_loan_days)
            .and_then(|days| today.checked_add_days(Days::new(days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            offer_window_days: OFFER_WINDOW_DAYS,
            initial_loan_days: INITIAL_LOAN_DAYS,
            max_extension_days: MAX_EXTENSION_DAYS,
            average_loan_days: AVERAGE_LOAN_DAYS,
        }
    }
}
