use crate::domain::{Book, MemberId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出履歴ポート
///
/// 貸出コンテキストと会員コンテキストの境界を維持する。
/// 貸出成功時に呼ばれるが、失敗しても貸出は取り消さない（ベストエフォート）。
pub trait BorrowingHistory: Send + Sync {
    /// 会員の利用履歴に書籍を追加する
    fn record_use(&self, member_id: MemberId, book: &Book) -> Result<()>;
}
