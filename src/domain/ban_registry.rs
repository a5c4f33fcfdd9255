use std::collections::HashSet;

use super::{Isbn, MemberId};

/// 延滞ペナルティの登録簿
///
/// 禁止は会員×ISBN単位。ISBN X で延滞している会員も ISBN Y は借りられる。
#[derive(Debug, Default)]
pub struct BanRegistry {
    bans: HashSet<(MemberId, Isbn)>,
}

impl BanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 禁止を登録する。新たに登録された場合のみ`true`
    pub fn ban(&mut self, member_id: MemberId, isbn: &Isbn) -> bool {
        self.bans.insert((member_id, isbn.clone()))
    }

    pub fn is_banned(&self, member_id: MemberId, isbn: &Isbn) -> bool {
        self.bans.contains(&(member_id, isbn.clone()))
    }

    /// 禁止を解除する。解除対象があった場合のみ`true`
    pub fn clear(&mut self, member_id: MemberId, isbn: &Isbn) -> bool {
        self.bans.remove(&(member_id, isbn.clone()))
    }
}
