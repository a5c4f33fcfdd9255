use std::collections::HashMap;

use super::{Author, Book, BookFormat, CatalogError, Isbn};

/// 蔵書カタログ
///
/// ISBNをキーに書籍を保持する。一覧は登録順を保つ。
/// 紙の本の `available` を変更できるのは在庫調整操作だけ。
#[derive(Debug, Default)]
pub struct BookCatalog {
    books: Vec<Book>,
    index: HashMap<Isbn, usize>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書籍を登録する
    ///
    /// # エラー
    /// - 同じISBNが既にあれば`CatalogError::DuplicateIsbn`
    /// - 紙の本の在庫数が総冊数と一致しなければ`CatalogError::InvariantViolation`
    ///   （登録時点では取り置きも貸出もないので全冊が在庫にある）
    pub fn add_book(&mut self, book: Book) -> Result<(), CatalogError> {
        if self.index.contains_key(&book.isbn) {
            return Err(CatalogError::DuplicateIsbn(book.isbn));
        }
        if let Some((total_copies, available)) = book.copy_counts() {
            if available != total_copies {
                return Err(CatalogError::InvariantViolation {
                    isbn: book.isbn,
                    detail: format!(
                        "new book must have all {} copies available, got {}",
                        total_copies, available
                    ),
                });
            }
        }
        self.index.insert(book.isbn.clone(), self.books.len());
        self.books.push(book);
        Ok(())
    }

    pub fn get(&self, isbn: &Isbn) -> Result<&Book, CatalogError> {
        self.index
            .get(isbn)
            .map(|&i| &self.books[i])
            .ok_or_else(|| CatalogError::NotFound(isbn.clone()))
    }

    pub fn contains(&self, isbn: &Isbn) -> bool {
        self.index.contains_key(isbn)
    }

    /// 登録順の全書籍
    pub fn list_all(&self) -> &[Book] {
        &self.books
    }

    /// 紙の本の `(total_copies, available)`
    pub fn physical_counts(&self, isbn: &Isbn) -> Result<(u32, u32), CatalogError> {
        self.get(isbn)?
            .copy_counts()
            .ok_or_else(|| CatalogError::NotPhysicalBook(isbn.clone()))
    }

    /// 在庫を1冊減らす（取り置き・貸出で持ち出されたとき）
    pub fn decrement_available(&mut self, isbn: &Isbn) -> Result<u32, CatalogError> {
        let (_, available) = self.physical_counts_mut(isbn)?;
        if *available == 0 {
            return Err(CatalogError::InvariantViolation {
                isbn: isbn.clone(),
                detail: "available copies would drop below zero".to_string(),
            });
        }
        *available -= 1;
        Ok(*available)
    }

    /// 在庫を1冊戻す（返却・取り置き失効のとき）
    pub fn increment_available(&mut self, isbn: &Isbn) -> Result<u32, CatalogError> {
        let (total_copies, available) = self.physical_counts_mut(isbn)?;
        if *available >= total_copies {
            return Err(CatalogError::InvariantViolation {
                isbn: isbn.clone(),
                detail: format!("available copies would exceed total of {}", total_copies),
            });
        }
        *available += 1;
        Ok(*available)
    }

    /// 著者のフルネームに `needle` を含む書籍
    pub fn search_by_author_full_name(&self, needle: &str) -> Vec<&Book> {
        self.search_authors(needle, |author, needle| author.full_name().contains(needle))
    }

    /// 著者の名に `needle` を含む書籍
    pub fn search_by_author_first_name(&self, needle: &str) -> Vec<&Book> {
        self.search_authors(needle, |author, needle| author.first_name.contains(needle))
    }

    /// 著者の姓に `needle` を含む書籍
    pub fn search_by_author_last_name(&self, needle: &str) -> Vec<&Book> {
        self.search_authors(needle, |author, needle| author.last_name.contains(needle))
    }

    fn search_authors(
        &self,
        needle: &str,
        matches: impl Fn(&Author, &str) -> bool,
    ) -> Vec<&Book> {
        if needle.trim().is_empty() {
            return Vec::new();
        }
        self.books
            .iter()
            .filter(|book| book.has_author_matching(|author| matches(author, needle)))
            .collect()
    }

    fn physical_counts_mut(&mut self, isbn: &Isbn) -> Result<(u32, &mut u32), CatalogError> {
        let &i = self
            .index
            .get(isbn)
            .ok_or_else(|| CatalogError::NotFound(isbn.clone()))?;
        match &mut self.books[i].format {
            BookFormat::Physical {
                total_copies,
                available,
            } => Ok((*total_copies, available)),
            _ => Err(CatalogError::NotPhysicalBook(isbn.clone())),
        }
    }
}
