use serde::{Deserialize, Serialize};

use super::MemberId;

/// 性別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

/// 住所
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub street: String,
}

impl Address {
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.street, self.city, self.country)
    }
}

/// 会員
///
/// 登録パイプラインを通過した会員。パスワードは保持しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    pub address: Address,
}
