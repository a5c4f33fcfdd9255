//! 登録パイプライン
//!
//! カタログへの書籍登録と会員登録の入力検証。規則は決められた順に検査し、
//! 最初に違反した規則をエラーとして返す。

mod book;
mod errors;
mod member;

pub use book::{BookDetails, NewDigitalBook, NewPaperBook};
pub use errors::{RegistrationError, Result};
pub use member::NewMember;
