use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{
    book::{BookId, mean, require_text},
    config::EmailPolicy,
    error::CatalogError,
    events::CatalogEvent,
};

/// The identity of a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct UserKey {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
}

/// A reader and the books they have read, each with an optional rating
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Full name, part of the identity
    name: String,
    /// Address, part of the identity
    email: String,
    /// One entry per book, in the order the book was first read
    books: Vec<(BookId, Option<i32>)>,
}

impl User {
    /// Create a user with an empty reading ledger
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` if the name is empty or the email
    /// does not satisfy `policy`
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        policy: &EmailPolicy,
    ) -> Result<Self, CatalogError> {
        let name = require_text("name", name)?;
        let email = email.into();
        policy.validate(&email)?;
        Ok(Self { name, email, books: Vec::new() })
    }

    /// Full name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current address
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Identity of the user
    #[must_use]
    pub fn key(&self) -> UserKey {
        UserKey { name: self.name.clone(), email: self.email.clone() }
    }

    /// First whitespace-separated token of the name
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Last whitespace-separated token of the name
    #[must_use]
    pub fn last_name(&self) -> &str {
        self.name.split_whitespace().next_back().unwrap_or(&self.name)
    }

    /// Replace the address
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` if `email` does not satisfy
    /// `policy`; the old address is kept
    pub fn change_email(
        &mut self,
        email: impl Into<String>,
        policy: &EmailPolicy,
    ) -> Result<CatalogEvent, CatalogError> {
        let email = email.into();
        policy.validate(&email)?;
        self.email.clone_from(&email);
        Ok(CatalogEvent::EmailChanged { first_name: self.first_name().to_owned(), email })
    }

    /// Record that `book` was read. Reading it again overwrites the rating
    /// but keeps the book's place in the ledger
    pub fn read_book(&mut self, book: BookId, rating: Option<i32>) {
        match self.books.iter_mut().find(|(id, _)| *id == book) {
            Some(entry) => entry.1 = rating,
            None => self.books.push((book, rating)),
        }
    }

    /// The rating given to `book`: `None` if unread, `Some(None)` if read
    /// without a rating
    #[must_use]
    pub fn rating_for(&self, book: BookId) -> Option<Option<i32>> {
        self.books.iter().find(|(id, _)| *id == book).map(|(_, rating)| *rating)
    }

    /// Mean of the ratings this user gave, `None` if they never rated
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        mean(self.books.iter().filter_map(|(_, rating)| *rating))
    }

    /// Books read, in the order they were first read
    pub fn book_list(&self) -> impl ExactSizeIterator<Item = BookId> + '_ {
        self.books.iter().map(|(id, _)| *id)
    }

    /// Number of distinct books read
    #[must_use]
    pub fn books_read(&self) -> usize {
        self.books.len()
    }

    /// Display order: by name alone
    #[must_use]
    pub fn cmp_name(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.email == other.email
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.email.hash(state);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User {} with email {} has read {} books",
            self.name,
            self.email,
            self.books.len()
        )
    }
}
