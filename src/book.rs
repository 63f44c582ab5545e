use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{config::RatingScale, error::CatalogError, events::CatalogEvent};

/// Stable handle to a book registered in a [`crate::Catalog`]. Only the
/// catalog that issued it accepts it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BookId {
    /// Stamp of the issuing catalog
    pub(crate) catalog: u64,
    /// Position in the issuing catalog's registration order
    pub(crate) index: usize,
}

impl BookId {
    /// Handle for the `index`-th book of catalog `catalog`
    pub(crate) const fn new(catalog: u64, index: usize) -> Self {
        Self { catalog, index }
    }

    /// Position of the book in registration order
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "book#{}", self.index)
    }
}

/// The identity of a book. Its `Ord` is a strict total order, title first
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct BookKey {
    /// Title of the book
    pub title: String,
    /// ISBN of the book
    pub isbn: u64,
}

/// What sort of book this is, with the fields that only that sort carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BookKind {
    /// A book with nothing beyond title, ISBN and cost
    #[default]
    Plain,
    /// A novel
    Fiction {
        /// Who wrote it
        author: String,
    },
    /// A manual on some subject
    NonFiction {
        /// What it covers
        subject: String,
        /// Intended reader level, e.g. "beginner"
        level: String,
    },
}

/// A catalogued work and the ratings it has accepted. Only the constructors
/// build one, so a `Book` always has a title and a valid cost
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    /// Title, part of the identity
    title: String,
    /// ISBN, part of the identity
    isbn: u64,
    /// Price of a copy
    cost: f64,
    /// Accepted ratings in arrival order
    ratings: Vec<i32>,
    /// Plain, fiction or non-fiction
    kind: BookKind,
}

/// Reject empty or whitespace-only text
pub(crate) fn require_text(field: &'static str, value: impl Into<String>) -> Result<String, CatalogError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(CatalogError::validation(field, "must not be empty"));
    }
    Ok(value)
}

/// A cost has to be a finite, non-negative amount
fn require_cost(cost: f64) -> Result<f64, CatalogError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(CatalogError::validation("cost", format!("{cost} is not a non-negative amount")));
    }
    Ok(cost)
}

/// Arithmetic mean, `None` for an empty sequence
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: impl IntoIterator<Item = i32>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), value| (sum + f64::from(value), count.saturating_add(1)));
    (count > 0).then(|| sum / count as f64)
}

impl Book {
    /// Create a plain book
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` if the title is empty or the cost
    /// is negative or not finite
    pub fn new(title: impl Into<String>, isbn: u64, cost: f64) -> Result<Self, CatalogError> {
        Self::with_kind(title, isbn, cost, BookKind::Plain)
    }

    /// Create a novel
    ///
    /// # Errors
    ///
    /// As [`Book::new`], and also if the author is empty
    pub fn fiction(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: u64,
        cost: f64,
    ) -> Result<Self, CatalogError> {
        let author = require_text("author", author)?;
        Self::with_kind(title, isbn, cost, BookKind::Fiction { author })
    }

    /// Create a non-fiction manual
    ///
    /// # Errors
    ///
    /// As [`Book::new`], and also if the subject or level is empty
    pub fn non_fiction(
        title: impl Into<String>,
        subject: impl Into<String>,
        level: impl Into<String>,
        isbn: u64,
        cost: f64,
    ) -> Result<Self, CatalogError> {
        let subject = require_text("subject", subject)?;
        let level = require_text("level", level)?;
        Self::with_kind(title, isbn, cost, BookKind::NonFiction { subject, level })
    }

    /// Shared constructor behind the three public ones
    fn with_kind(
        title: impl Into<String>,
        isbn: u64,
        cost: f64,
        kind: BookKind,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            title: require_text("title", title)?,
            isbn,
            cost: require_cost(cost)?,
            ratings: Vec::new(),
            kind,
        })
    }

    /// Title of the book
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current ISBN
    #[must_use]
    pub fn isbn(&self) -> u64 {
        self.isbn
    }

    /// Price of a copy
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Which sort of book this is
    #[must_use]
    pub fn kind(&self) -> &BookKind {
        &self.kind
    }

    /// Author, for fiction only
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        match &self.kind {
            BookKind::Fiction { author } => Some(author),
            _ => None,
        }
    }

    /// Subject, for non-fiction only
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match &self.kind {
            BookKind::NonFiction { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Reader level, for non-fiction only
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        match &self.kind {
            BookKind::NonFiction { level, .. } => Some(level),
            _ => None,
        }
    }

    /// Accepted ratings in arrival order
    #[must_use]
    pub fn ratings(&self) -> &[i32] {
        &self.ratings
    }

    /// Identity of the book
    #[must_use]
    pub fn key(&self) -> BookKey {
        BookKey { title: self.title.clone(), isbn: self.isbn }
    }

    /// Whether `other` shares this book's (title, isbn)
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.title == other.title && self.isbn == other.isbn
    }

    /// Display order: by title alone, so two editions of one title compare
    /// `Equal` here even though they are not `==`
    #[must_use]
    pub fn cmp_title(&self, other: &Self) -> Ordering {
        self.title.cmp(&other.title)
    }

    /// Offer a rating. `None` is ignored. A value outside `scale` is dropped
    /// and the returned event describes the rejection
    pub fn add_rating(&mut self, rating: Option<i32>, scale: &RatingScale) -> Option<CatalogEvent> {
        let rating = rating?;
        if scale.contains(rating) {
            self.ratings.push(rating);
            None
        } else {
            Some(CatalogEvent::InvalidRating { title: self.title.clone(), rating })
        }
    }

    /// Mean of the accepted ratings, `None` if there are none
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        mean(self.ratings.iter().copied())
    }

    /// Change the price
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` if the cost is negative or not
    /// finite; the old cost is kept
    pub fn set_cost(&mut self, cost: f64) -> Result<(), CatalogError> {
        self.cost = require_cost(cost)?;
        Ok(())
    }

    /// Change the ISBN. This does not look at any other book; go through
    /// [`crate::Catalog::set_book_isbn`] to keep ISBNs unique
    pub fn set_isbn(&mut self, isbn: u64) -> CatalogEvent {
        self.isbn = isbn;
        CatalogEvent::IsbnChanged { title: self.title.clone(), isbn }
    }
}

impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for Book {}

impl Hash for Book {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.isbn.hash(state);
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BookKind::Plain => write!(f, "{}", self.title),
            BookKind::Fiction { author } => write!(f, "{} by {author}", self.title),
            BookKind::NonFiction { subject, level } => {
                write!(f, "{}, a {level} manual on {subject}", self.title)
            }
        }
    }
}
