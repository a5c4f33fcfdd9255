pub mod borrowing_history;

pub use borrowing_history::BorrowingHistory;
