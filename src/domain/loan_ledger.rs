use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Isbn, LendingPolicy, LoanError, MemberId};

/// 貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    /// 成功した延長の回数
    pub extensions_used: u32,
}

impl Loan {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_on < today
    }
}

/// 貸出台帳
///
/// 不変条件：
/// - 会員×ISBNにつき有効な貸出は1件まで
/// - 返却期限は 貸出日 + 貸出期間 + 延長上限 を超えない（延長の刻み幅や回数に依らない）
#[derive(Debug)]
pub struct LoanLedger {
    loans: Vec<Loan>,
    policy: LendingPolicy,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::with_policy(LendingPolicy::default())
    }

    pub fn with_policy(policy: LendingPolicy) -> Self {
        Self {
            loans: Vec::new(),
            policy,
        }
    }

    /// 貸出を作成する（返却期限 = 今日 + 貸出期間、延長0回）
    pub fn create_loan(
        &mut self,
        member_id: MemberId,
        isbn: &Isbn,
        today: NaiveDate,
    ) -> Result<&Loan, LoanError> {
        if self.position(member_id, isbn).is_some() {
            return Err(LoanError::DuplicateLoan);
        }
        let due_on = self
            .policy
            .initial_due_date(today)
            .ok_or(LoanError::DateOutOfRange {
                from: today,
                days: self.policy.initial_loan_days,
            })?;
        self.loans.push(Loan {
            member_id,
            isbn: isbn.clone(),
            borrowed_on: today,
            due_on,
            extensions_used: 0,
        });
        Ok(&self.loans[self.loans.len() - 1])
    }

    pub fn find(&self, member_id: MemberId, isbn: &Isbn) -> Result<&Loan, LoanError> {
        self.position(member_id, isbn)
            .map(|i| &self.loans[i])
            .ok_or(LoanError::NotBorrowed)
    }

    /// 返却期限を `days` 日延ばし、新しい返却期限を返す
    ///
    /// # エラー
    /// - 貸出がなければ`LoanError::NotBorrowed`
    /// - `due_on + days > borrowed_on + 28` なら`LoanError::ExtensionLimitExceeded`
    ///   （暦の範囲を超えるほど大きな `days` も同じ扱い）
    pub fn extend(
        &mut self,
        member_id: MemberId,
        isbn: &Isbn,
        days: u32,
    ) -> Result<NaiveDate, LoanError> {
        let index = self
            .position(member_id, isbn)
            .ok_or(LoanError::NotBorrowed)?;
        let loan = &mut self.loans[index];

        let latest_due_date = self
            .policy
            .latest_due_date(loan.borrowed_on)
            .ok_or(LoanError::DateOutOfRange {
                from: loan.borrowed_on,
                days: self
                    .policy
                    .initial_loan_days
                    .saturating_add(self.policy.max_extension_days),
            })?;
        let requested = loan.due_on.checked_add_days(Days::new(u64::from(days)));
        let new_due_on = match requested {
            Some(due_on) if due_on <= latest_due_date => due_on,
            _ => return Err(LoanError::ExtensionLimitExceeded { latest_due_date }),
        };

        if days > 0 {
            loan.due_on = new_due_on;
            loan.extensions_used += 1;
        }
        Ok(loan.due_on)
    }

    /// 貸出を削除する（返却時）
    pub fn remove(&mut self, member_id: MemberId, isbn: &Isbn) -> Result<Loan, LoanError> {
        let index = self
            .position(member_id, isbn)
            .ok_or(LoanError::NotBorrowed)?;
        Ok(self.loans.remove(index))
    }

    /// `due_on < today` の貸出の遅延列
    pub fn overdue_as_of(&self, today: NaiveDate) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(move |l| l.is_overdue(today))
    }

    pub fn loans_for(&self, member_id: MemberId) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(move |l| l.member_id == member_id)
    }

    /// ISBNごとの貸出数
    pub fn count_for(&self, isbn: &Isbn) -> usize {
        self.loans.iter().filter(|l| &l.isbn == isbn).count()
    }

    fn position(&self, member_id: MemberId, isbn: &Isbn) -> Option<usize> {
        self.loans
            .iter()
            .position(|l| l.member_id == member_id && &l.isbn == isbn)
    }
}

impl Default for LoanLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    fn isbn() -> Isbn {
        Isbn::from("1234-5")
    }

    // TDD: create_loan() のテスト
    #[test]
    fn test_create_loan_sets_fourteen_day_due_date() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();

        let loan = ledger.create_loan(member, &isbn(), day(0)).unwrap();
        assert_eq!(loan.borrowed_on, day(0));
        assert_eq!(loan.due_on, day(14));
        assert_eq!(loan.extensions_used, 0);
    }

    #[test]
    fn test_create_loan_rejects_second_loan_for_same_pair() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();
        ledger.create_loan(member, &isbn(), day(0)).unwrap();

        let result = ledger.create_loan(member, &isbn(), day(1));
        assert_eq!(result.unwrap_err(), LoanError::DuplicateLoan);
    }

    // TDD: extend() のテスト
    #[test]
    fn test_extend_by_seven_days_hits_cap_on_third_call() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();
        ledger.create_loan(member, &isbn(), day(0)).unwrap();

        assert_eq!(ledger.extend(member, &isbn(), 7), Ok(day(21)));
        assert_eq!(ledger.extend(member, &isbn(), 7), Ok(day(28)));
        assert_eq!(
            ledger.extend(member, &isbn(), 7),
            Err(LoanError::ExtensionLimitExceeded {
                latest_due_date: day(28)
            })
        );

        let loan = ledger.find(member, &isbn()).unwrap();
        assert_eq!(loan.due_on, day(28));
        assert_eq!(loan.extensions_used, 2);
    }

    #[test]
    fn test_extend_by_one_day_never_passes_cap() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();
        ledger.create_loan(member, &isbn(), day(0)).unwrap();

        let granted = (0..30)
            .filter(|_| ledger.extend(member, &isbn(), 1).is_ok())
            .count();

        assert_eq!(granted, 14);
        assert_eq!(ledger.find(member, &isbn()).unwrap().due_on, day(28));
    }

    #[test]
    fn test_extend_by_huge_days_is_limit_exceeded() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();
        ledger.create_loan(member, &isbn(), day(0)).unwrap();

        assert_eq!(
            ledger.extend(member, &isbn(), u32::MAX),
            Err(LoanError::ExtensionLimitExceeded {
                latest_due_date: day(28)
            })
        );
        assert_eq!(ledger.find(member, &isbn()).unwrap().due_on, day(14));
    }

    #[test]
    fn test_periods_follow_policy() {
        let policy = LendingPolicy {
            initial_loan_days: 7,
            max_extension_days: 3,
            ..LendingPolicy::default()
        };
        let mut ledger = LoanLedger::with_policy(policy);
        let member = MemberId::new();

        assert_eq!(ledger.create_loan(member, &isbn(), day(0)).unwrap().due_on, day(7));
        assert_eq!(ledger.extend(member, &isbn(), 3), Ok(day(10)));
        assert_eq!(
            ledger.extend(member, &isbn(), 1),
            Err(LoanError::ExtensionLimitExceeded {
                latest_due_date: day(10)
            })
        );
    }

    #[test]
    fn test_extend_without_loan_is_not_borrowed() {
        let mut ledger = LoanLedger::new();
        assert_eq!(
            ledger.extend(MemberId::new(), &isbn(), 1),
            Err(LoanError::NotBorrowed)
        );
    }

    #[test]
    fn test_overdue_as_of_is_strictly_after_due_date() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();
        ledger.create_loan(member, &isbn(), day(0)).unwrap();

        assert_eq!(ledger.overdue_as_of(day(14)).count(), 0);
        assert_eq!(ledger.overdue_as_of(day(15)).count(), 1);
    }

    #[test]
    fn test_remove_deletes_loan() {
        let mut ledger = LoanLedger::new();
        let member = MemberId::new();
        ledger.create_loan(member, &isbn(), day(0)).unwrap();

        assert!(ledger.remove(member, &isbn()).is_ok());
        assert_eq!(ledger.find(member, &isbn()), Err(LoanError::NotBorrowed));
        assert_eq!(ledger.count_for(&isbn()), 0);
    }
}
