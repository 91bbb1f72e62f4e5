//! Ownership guard for mutating posts and comments.

use uuid::Uuid;

use crate::domain::{Comment, Post};

/// A record with a single owning author.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

/// Why a mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No authenticated requester; send them to log in.
    Unauthenticated,
    /// Authenticated, but not the author; send them back to the record.
    NotOwner,
}

/// Allow the mutation only when `requester` is the record's author.
pub fn authorize_owner<R: Owned>(record: &R, requester: Option<Uuid>) -> Result<(), AccessDenied> {
    match requester {
        None => Err(AccessDenied::Unauthenticated),
        Some(id) if id == record.owner_id() => Ok(()),
        Some(_) => Err(AccessDenied::NotOwner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_owner() {
        let author = Uuid::new_v4();
        let comment = Comment::new(Uuid::new_v4(), author, "nice".into());

        assert_eq!(authorize_owner(&comment, Some(author)), Ok(()));
        assert_eq!(
            authorize_owner(&comment, Some(Uuid::new_v4())),
            Err(AccessDenied::NotOwner)
        );
        assert_eq!(
            authorize_owner(&comment, None),
            Err(AccessDenied::Unauthenticated)
        );
    }
}
