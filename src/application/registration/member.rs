use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::domain::{Address, Gender, Member, MemberId};

use super::book::is_blank;
use super::errors::{RegistrationError, Result};

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-z][a-zA-Z0-9_.]*@([a-z][a-zA-Z0-9_]*\.)+[a-zA-Z]+$").unwrap();
}

/// 会員登録フォーム
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    pub address: Address,
    pub email: String,
    pub gdpr_consent: bool,
}

impl NewMember {
    /// フォームを検証して会員を作る
    ///
    /// `username_taken` は既存会員とのユーザー名重複を判定する。
    /// パスワードは形式だけを確認し、`Member` には残さない。
    pub fn validate(self, username_taken: impl Fn(&str) -> bool) -> Result<Member> {
        if !self.gdpr_consent {
            return Err(RegistrationError::GdprConsentMissing);
        }

        if is_blank(&self.username) || self.username.chars().count() <= 7 {
            return Err(RegistrationError::InvalidUsername);
        }
        if username_taken(&self.username) {
            return Err(RegistrationError::UsernameTaken(self.username));
        }

        if is_blank(&self.password) || self.password.chars().count() <= 4 {
            return Err(RegistrationError::InvalidPassword);
        }

        if !is_valid_name(&self.first_name) || !is_valid_name(&self.last_name) {
            return Err(RegistrationError::InvalidName);
        }

        if !(7..=124).contains(&self.age) {
            return Err(RegistrationError::InvalidAge);
        }

        let address = &self.address;
        if is_blank(&address.country) || is_blank(&address.city) || is_blank(&address.street) {
            return Err(RegistrationError::InvalidAddress);
        }

        if !EMAIL_PATTERN.is_match(&self.email) {
            return Err(RegistrationError::InvalidEmail);
        }

        Ok(Member {
            member_id: MemberId::new(),
            username: self.username,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email,
            age: self.age,
            gender: self.gender,
            address: self.address,
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    (2..=20).contains(&name.trim().chars().count())
}
