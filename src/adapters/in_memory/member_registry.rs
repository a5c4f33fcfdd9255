use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::domain::{Book, Isbn, Member, MemberId};
use crate::ports::borrowing_history::{BorrowingHistory, Result};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberRegistryError {
    #[error("Member {0} is not registered")]
    UnknownMember(MemberId),
    #[error("Username {0} is already taken")]
    UsernameTaken(String),
}

#[derive(Debug, Default)]
struct Registry {
    members: HashMap<MemberId, Member>,
    usernames: HashMap<String, MemberId>,
    histories: HashMap<MemberId, Vec<Isbn>>,
}

/// In-memory member directory
///
/// Keeps registered members and the ISBNs each of them has borrowed,
/// in borrowing order. Also serves as the borrowing history collaborator
/// of the lending coordinator.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    inner: Mutex<Registry>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already validated member
    ///
    /// The username check and the insert happen under one lock, so two
    /// registrations racing for the same username cannot both succeed.
    pub fn register(&self, member: Member) -> std::result::Result<(), MemberRegistryError> {
        let mut registry = self.lock();
        if registry.usernames.contains_key(&member.username) {
            return Err(MemberRegistryError::UsernameTaken(member.username));
        }
        registry
            .usernames
            .insert(member.username.clone(), member.member_id);
        registry.histories.entry(member.member_id).or_default();
        registry.members.insert(member.member_id, member);
        Ok(())
    }

    pub fn is_username_taken(&self, username: &str) -> bool {
        self.lock().usernames.contains_key(username)
    }

    pub fn find_by_username(&self, username: &str) -> Option<Member> {
        let registry = self.lock();
        registry
            .usernames
            .get(username)
            .and_then(|id| registry.members.get(id))
            .cloned()
    }

    pub fn get(&self, member_id: MemberId) -> Option<Member> {
        self.lock().members.get(&member_id).cloned()
    }

    pub fn contains(&self, member_id: MemberId) -> bool {
        self.lock().members.contains_key(&member_id)
    }

    /// ISBNs the member has borrowed, oldest first
    pub fn history(&self, member_id: MemberId) -> Vec<Isbn> {
        self.lock()
            .histories
            .get(&member_id)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BorrowingHistory for MemberRegistry {
    fn record_use(&self, member_id: MemberId, book: &Book) -> Result<()> {
        let mut registry = self.lock();
        let history = registry
            .histories
            .get_mut(&member_id)
            .ok_or(MemberRegistryError::UnknownMember(member_id))?;
        history.push(book.isbn.clone());
        Ok(())
    }
}
