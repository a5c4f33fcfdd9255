use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Isbn;

/// ジャンル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Drama,
    Horror,
    SciFi,
    Science,
    Fantasy,
}

/// カテゴリ（タグ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Children,
    Story,
    Learning,
    Hobby,
}

/// 著者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 書籍の形態
///
/// 貸出サブシステムが扱うのは `Physical` のみ。
/// 電子書籍の2形態は作成後に状態を持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookFormat {
    /// 紙の本。`available` だけが可変
    Physical { total_copies: u32, available: u32 },
    /// オンラインで読める電子書籍
    Readable { online_link: String },
    /// オンライン閲覧とダウンロードが可能な電子書籍
    Downloadable {
        online_link: String,
        download_link: String,
    },
}

/// 書籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
    pub summary: String,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub categories: Vec<Category>,
    pub format: BookFormat,
}

impl Book {
    /// 全冊が在庫にある状態の紙の本を作る
    pub fn paper(isbn: Isbn, title: impl Into<String>, total_copies: u32) -> Self {
        Self {
            isbn,
            title: title.into(),
            summary: String::new(),
            authors: Vec::new(),
            genres: Vec::new(),
            categories: Vec::new(),
            format: BookFormat::Physical {
                total_copies,
                available: total_copies,
            },
        }
    }

    pub fn is_physical(&self) -> bool {
        matches!(self.format, BookFormat::Physical { .. })
    }

    /// 紙の本なら `(total_copies, available)` を返す
    pub fn copy_counts(&self) -> Option<(u32, u32)> {
        match self.format {
            BookFormat::Physical {
                total_copies,
                available,
            } => Some((total_copies, available)),
            _ => None,
        }
    }

    pub fn has_author_matching(&self, predicate: impl Fn(&Author) -> bool) -> bool {
        self.authors.iter().any(predicate)
    }
}
