use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::domain::{Author, Book, BookCatalog, BookFormat, Category, Genre, Isbn};

use super::errors::{RegistrationError, Result};

lazy_static! {
    static ref ISBN_PATTERN: Regex = Regex::new(r"^[0-9]{4}-[0-9]$").unwrap();
    static ref LINK_PATTERN: Regex =
        Regex::new(r"^https?://(www\.)?([a-z0-9-]+\.)+[a-z]+(:[0-9]{1,4})?(/\S*)?$").unwrap();
}

/// 紙の本・電子書籍に共通の書誌情報
#[derive(Debug, Clone, Deserialize)]
pub struct BookDetails {
    pub isbn: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub categories: Vec<Category>,
}

/// 紙の本の登録フォーム
#[derive(Debug, Clone, Deserialize)]
pub struct NewPaperBook {
    #[serde(flatten)]
    pub details: BookDetails,
    pub total_copies: u32,
}

/// 電子書籍の登録フォーム
///
/// `download_link` があればダウンロード可能な電子書籍になる。
#[derive(Debug, Clone, Deserialize)]
pub struct NewDigitalBook {
    #[serde(flatten)]
    pub details: BookDetails,
    pub online_link: String,
    #[serde(default)]
    pub download_link: Option<String>,
}

impl NewPaperBook {
    /// フォームを検証し、全冊が在庫にある紙の本を作る
    pub fn validate(self, catalog: &BookCatalog) -> Result<Book> {
        let isbn = validate_details(&self.details, catalog)?;
        if self.total_copies < 1 {
            return Err(RegistrationError::NoCopies);
        }

        Ok(self.details.into_book(
            isbn,
            BookFormat::Physical {
                total_copies: self.total_copies,
                available: self.total_copies,
            },
        ))
    }
}

impl NewDigitalBook {
    /// フォームを検証し、電子書籍を作る
    pub fn validate(self, catalog: &BookCatalog) -> Result<Book> {
        let isbn = validate_details(&self.details, catalog)?;
        validate_link(&self.online_link)?;
        if let Some(download_link) = &self.download_link {
            validate_link(download_link)?;
        }

        let format = match self.download_link {
            Some(download_link) => BookFormat::Downloadable {
                online_link: self.online_link,
                download_link,
            },
            None => BookFormat::Readable {
                online_link: self.online_link,
            },
        };
        Ok(self.details.into_book(isbn, format))
    }
}

impl BookDetails {
    fn into_book(self, isbn: Isbn, format: BookFormat) -> Book {
        Book {
            isbn,
            title: self.title,
            summary: self.summary,
            authors: self.authors,
            genres: self.genres,
            categories: self.categories,
            format,
        }
    }
}

/// 書誌情報の検証（ISBN → タイトル → 概要 → 著者 → ジャンル → カテゴリ）
fn validate_details(details: &BookDetails, catalog: &BookCatalog) -> Result<Isbn> {
    let isbn = Isbn::new(details.isbn.as_str());
    if !ISBN_PATTERN.is_match(isbn.as_str()) {
        return Err(RegistrationError::InvalidIsbn);
    }
    if catalog.contains(&isbn) {
        return Err(RegistrationError::DuplicateIsbn(isbn.to_string()));
    }

    if is_blank(&details.title) || details.title.chars().count() <= 3 {
        return Err(RegistrationError::InvalidTitle);
    }
    if is_blank(&details.summary) || details.summary.chars().count() <= 50 {
        return Err(RegistrationError::InvalidSummary);
    }
    if details.authors.is_empty() {
        return Err(RegistrationError::MissingAuthor);
    }
    if details.genres.is_empty() {
        return Err(RegistrationError::MissingGenre);
    }
    if details.categories.is_empty() {
        return Err(RegistrationError::MissingCategory);
    }

    Ok(isbn)
}

fn validate_link(link: &str) -> Result<()> {
    if LINK_PATTERN.is_match(link) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidLink(link.to_string()))
    }
}

pub(super) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
