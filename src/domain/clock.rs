use chrono::{Days, NaiveDate};

use super::ClockError;

/// 論理時計
///
/// 壁時計とは無関係に、`advance` が呼ばれたときだけ進む「今日」。
/// これにより期限に関する振る舞いはすべて決定的に再現できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalClock {
    today: NaiveDate,
}

impl LogicalClock {
    pub fn starting_at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// 時計を `days` 日進め、新しい今日を返す
    ///
    /// 暦の範囲を超える場合は`ClockError::OutOfRange`を返し、時計は動かない。
    pub fn advance(&mut self, days: u32) -> Result<NaiveDate, ClockError> {
        self.today = self
            .today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or(ClockError::OutOfRange {
                today: self.today,
                days,
            })?;
        Ok(self.today)
    }
}
