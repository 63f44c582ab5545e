use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-fatal notifications raised while the catalog is mutated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CatalogEvent {
    /// A book was associated with an email nobody is registered under
    UnknownUser {
        /// The unregistered address
        email: String,
    },
    /// A user was added under an email that is already taken
    DuplicateUser {
        /// The address already in use
        email: String,
    },
    /// A rating outside the scale was offered to a book and dropped
    InvalidRating {
        /// Title of the book that refused it
        title: String,
        /// The rejected value
        rating: i32,
    },
    /// A user's address changed
    EmailChanged {
        /// First token of the user's name
        first_name: String,
        /// The new address
        email: String,
    },
    /// A book's ISBN changed
    IsbnChanged {
        /// Title of the updated book
        title: String,
        /// The new ISBN
        isbn: u64,
    },
}

impl CatalogEvent {
    /// Whether the event reports a call that was turned into a no-op
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::UnknownUser { .. } | Self::DuplicateUser { .. } | Self::InvalidRating { .. })
    }
}

impl fmt::Display for CatalogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUser { email } => write!(f, "No user with email {email}!"),
            Self::DuplicateUser { email } => write!(f, "User with email {email} already exists"),
            Self::InvalidRating { title, rating } => {
                write!(f, "Invalid rating {rating} for {title}")
            }
            Self::EmailChanged { first_name, email } => {
                write!(f, "{first_name}'s address has been updated to {email}")
            }
            Self::IsbnChanged { title, isbn } => write!(f, "{title} has updated isbn to {isbn}"),
        }
    }
}
