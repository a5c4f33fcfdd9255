pub mod ban_registry;
pub mod book;
pub mod catalog;
pub mod clock;
pub mod errors;
pub mod events;
pub mod loan_ledger;
pub mod member;
pub mod offer_ledger;
pub mod policy;
pub mod request_queue;
pub mod value_objects;

pub use ban_registry::BanRegistry;
pub use book::*;
pub use catalog::BookCatalog;
pub use clock::LogicalClock;
pub use errors::*;
pub use events::*;
pub use loan_ledger::{Loan, LoanLedger};
pub use member::{Address, Gender, Member};
pub use offer_ledger::{Offer, OfferLedger};
pub use policy::LendingPolicy;
pub use request_queue::{Request, RequestQueue};
pub use value_objects::*;
