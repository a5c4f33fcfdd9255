use thiserror::Error;

/// 登録パイプラインのエラー
///
/// 規則は決められた順に検査し、最初に違反した規則だけを返す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    // ------------------------------------------------------------------
    // 書籍
    // ------------------------------------------------------------------
    #[error("ISBN must have the format '####-#'")]
    InvalidIsbn,

    #[error("Book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("Title must be longer than 3 characters")]
    InvalidTitle,

    #[error("Summary must be longer than 50 characters")]
    InvalidSummary,

    #[error("At least one author is required")]
    MissingAuthor,

    #[error("At least one genre is required")]
    MissingGenre,

    #[error("At least one category is required")]
    MissingCategory,

    #[error("A paper book needs at least one copy")]
    NoCopies,

    #[error("Link is not a valid http(s) address: {0}")]
    InvalidLink(String),

    // ------------------------------------------------------------------
    // 会員
    // ------------------------------------------------------------------
    #[error("GDPR consent is required")]
    GdprConsentMissing,

    #[error("Username must be longer than 7 characters")]
    InvalidUsername,

    #[error("Username {0} is already taken")]
    UsernameTaken(String),

    #[error("Password must be longer than 4 characters")]
    InvalidPassword,

    #[error("First and last name must be 2 to 20 characters long")]
    InvalidName,

    #[error("Age must be between 7 and 124")]
    InvalidAge,

    #[error("Country, city and street must not be empty")]
    InvalidAddress,

    #[error("Email address is not valid")]
    InvalidEmail,
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
