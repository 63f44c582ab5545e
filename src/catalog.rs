use std::{
    cmp::Ordering,
    collections::{HashMap, VecDeque},
    fmt,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    book::{Book, BookId, BookKey},
    config::CatalogConfig,
    error::CatalogError,
    events::CatalogEvent,
    observers::CatalogObserver,
    user::User,
};

/// A registered book together with its read-count
#[derive(Debug, Clone)]
struct Entry {
    /// The book itself
    book: Book,
    /// Number of association events, not distinct readers
    read_count: usize,
}

/// Result of [`Catalog::worth_of_user`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum UserWorth {
    /// Summed cost of every book in the user's list
    Total(f64),
    /// Nobody is registered under the email
    UnknownUser(String),
}

impl fmt::Display for UserWorth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total(total) => write!(f, "{total:.2}"),
            Self::UnknownUser(email) => write!(f, "No user with email {email} exists"),
        }
    }
}

/// Stamp source for catalogs, so handles from one are refused by another
static NEXT_CATALOG_STAMP: AtomicU64 = AtomicU64::new(1);

/// Keep the first element that no later element beats
fn first_max_by<T>(items: impl IntoIterator<Item = T>, mut cmp: impl FnMut(&T, &T) -> Ordering) -> Option<T> {
    items
        .into_iter()
        .reduce(|best, next| if cmp(&next, &best) == Ordering::Greater { next } else { best })
}

/// Pick the entry with the best average. Unrated entries only win when
/// nothing is rated, and then the first one does
fn best_average<T>(items: impl IntoIterator<Item = (T, Option<f64>)>) -> Option<T> {
    let mut first_unrated = None;
    let mut best: Option<(T, f64)> = None;
    for (item, average) in items {
        match average {
            Some(avg) => {
                let beats = best
                    .as_ref()
                    .is_none_or(|(_, best_avg)| avg.total_cmp(best_avg) == Ordering::Greater);
                if beats {
                    best = Some((item, avg));
                }
            }
            None => {
                if first_unrated.is_none() {
                    first_unrated = Some(item);
                }
            }
        }
    }
    best.map(|(item, _)| item).or(first_unrated)
}

/// Books, users, and who read what
pub struct Catalog {
    /// Stamp carried by every `BookId` this catalog issues
    stamp: u64,
    /// Validation rules and history bound
    config: CatalogConfig,
    /// Registered books, indexed by `BookId`
    entries: Vec<Entry>,
    /// Registered users in registration order
    users: Vec<User>,
    /// Email to position in `users`
    user_index: HashMap<String, usize>,
    /// Most recent notifications, oldest first
    history: VecDeque<CatalogEvent>,
    /// Registered notification observers
    observers: Vec<Box<dyn CatalogObserver>>,
}

// Manual implementation of Debug for Catalog
impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("stamp", &self.stamp)
            .field("config", &self.config)
            .field("entries", &self.entries)
            .field("users", &self.users)
            .field("history", &self.history)
            .field("observers_count", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Create an empty catalog with the given configuration
    #[must_use]
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            stamp: NEXT_CATALOG_STAMP.fetch_add(1, AtomicOrdering::Relaxed),
            config,
            entries: Vec::new(),
            users: Vec::new(),
            user_index: HashMap::new(),
            history: VecDeque::new(),
            observers: Vec::new(),
        }
    }

    /// The configuration this catalog validates against
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Register an observer to be notified of every catalog event
    pub fn register_observer(&mut self, observer: Box<dyn CatalogObserver>) {
        self.observers.push(observer);
    }

    /// Notifications raised so far, oldest first, bounded by
    /// `max_history_size`
    #[must_use]
    pub fn history(&self) -> &VecDeque<CatalogEvent> {
        &self.history
    }

    /// Record an event and hand it to every observer
    fn notify(&mut self, event: CatalogEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
        if self.config.max_history_size == 0 {
            return;
        }
        if self.history.len() >= self.config.max_history_size {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }

    /// Create and register a plain book
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` for malformed arguments, or a
    /// `CatalogError::DuplicateIsbn` if a different book already holds `isbn`
    pub fn create_book(&mut self, title: &str, isbn: u64, cost: f64) -> Result<BookId, CatalogError> {
        self.register(Book::new(title, isbn, cost)?)
    }

    /// Create and register a novel
    ///
    /// # Errors
    ///
    /// As [`Catalog::create_book`]
    pub fn create_novel(
        &mut self,
        title: &str,
        author: &str,
        isbn: u64,
        cost: f64,
    ) -> Result<BookId, CatalogError> {
        self.register(Book::fiction(title, author, isbn, cost)?)
    }

    /// Create and register a non-fiction manual
    ///
    /// # Errors
    ///
    /// As [`Catalog::create_book`]
    pub fn create_non_fiction(
        &mut self,
        title: &str,
        subject: &str,
        level: &str,
        isbn: u64,
        cost: f64,
    ) -> Result<BookId, CatalogError> {
        self.register(Book::non_fiction(title, subject, level, isbn, cost)?)
    }

    /// Register a book. A book identical by key to one already present
    /// yields the existing handle and leaves its entry untouched
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` if the book carries a rating
    /// outside this catalog's scale, or a `CatalogError::DuplicateIsbn` if a
    /// book with another title already holds the ISBN
    pub fn register(&mut self, book: Book) -> Result<BookId, CatalogError> {
        let scale = self.config.rating_scale;
        if let Some(rating) = book.ratings().iter().find(|rating| !scale.contains(**rating)) {
            return Err(CatalogError::validation(
                "ratings",
                format!("{rating} is outside {}..={}", scale.min, scale.max),
            ));
        }
        if let Some((id, existing)) = self.books().find(|(_, b)| b.isbn() == book.isbn()) {
            if existing.same_identity(&book) {
                debug!(%id, title = book.title(), "book already registered");
                return Ok(id);
            }
            return Err(CatalogError::DuplicateIsbn {
                isbn: book.isbn(),
                existing: existing.title().to_owned(),
                attempted: book.title().to_owned(),
            });
        }

        let id = BookId::new(self.stamp, self.entries.len());
        debug!(%id, title = book.title(), isbn = book.isbn(), "registered book");
        self.entries.push(Entry { book, read_count: 0 });
        Ok(id)
    }

    /// Position of `id` in `entries`, `None` if another catalog issued it
    fn slot(&self, id: BookId) -> Option<usize> {
        (id.catalog == self.stamp).then_some(id.index)
    }

    /// Look up a book by handle
    #[must_use]
    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.slot(id).and_then(|idx| self.entries.get(idx)).map(|entry| &entry.book)
    }

    /// Look up a book by identity
    #[must_use]
    pub fn find_book(&self, key: &BookKey) -> Option<BookId> {
        self.books().find(|(_, b)| b.title() == key.title && b.isbn() == key.isbn).map(|(id, _)| id)
    }

    /// Number of association events recorded for a book
    #[must_use]
    pub fn read_count(&self, id: BookId) -> Option<usize> {
        self.slot(id).and_then(|idx| self.entries.get(idx)).map(|entry| entry.read_count)
    }

    /// Every book in registration order
    pub fn books(&self) -> impl ExactSizeIterator<Item = (BookId, &Book)> + '_ {
        let stamp = self.stamp;
        self.entries.iter().enumerate().map(move |(idx, entry)| (BookId::new(stamp, idx), &entry.book))
    }

    /// Every user in registration order
    pub fn users(&self) -> impl ExactSizeIterator<Item = &User> + '_ {
        self.users.iter()
    }

    /// Look up a user by email
    #[must_use]
    pub fn user(&self, email: &str) -> Option<&User> {
        self.user_index.get(email).and_then(|&idx| self.users.get(idx))
    }

    /// Mutable access to a registered book
    fn entry_mut(&mut self, id: BookId) -> Result<&mut Entry, CatalogError> {
        let idx = self.slot(id).ok_or(CatalogError::UnknownBook(id))?;
        self.entries.get_mut(idx).ok_or(CatalogError::UnknownBook(id))
    }

    /// Change a registered book's price
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::UnknownBook` for a foreign handle, or a
    /// `CatalogError::Validation` for a bad cost
    pub fn set_book_cost(&mut self, id: BookId, cost: f64) -> Result<(), CatalogError> {
        self.entry_mut(id)?.book.set_cost(cost)
    }

    /// Change a registered book's ISBN, keeping ISBNs unique
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::UnknownBook` for a foreign handle, or a
    /// `CatalogError::DuplicateIsbn` if another book holds `isbn`
    pub fn set_book_isbn(&mut self, id: BookId, isbn: u64) -> Result<(), CatalogError> {
        let title = self.book(id).ok_or(CatalogError::UnknownBook(id))?.title().to_owned();
        if let Some((_, holder)) = self.books().find(|(other, b)| *other != id && b.isbn() == isbn) {
            return Err(CatalogError::DuplicateIsbn {
                isbn,
                existing: holder.title().to_owned(),
                attempted: title,
            });
        }
        let event = self.entry_mut(id)?.book.set_isbn(isbn);
        self.notify(event);
        Ok(())
    }

    /// Register a user and mark each of `initial_books` as read, unrated.
    /// An email that is already registered is reported and nothing changes
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` for a bad name or email, or a
    /// `CatalogError::UnknownBook` if an initial book is foreign; in both
    /// cases nothing is registered
    pub fn add_user(&mut self, name: &str, email: &str, initial_books: &[BookId]) -> Result<(), CatalogError> {
        if self.user_index.contains_key(email) {
            self.notify(CatalogEvent::DuplicateUser { email: email.to_owned() });
            return Ok(());
        }
        let user = User::new(name, email, &self.config.email_policy)?;
        if let Some(&foreign) = initial_books.iter().find(|id| self.book(**id).is_none()) {
            return Err(CatalogError::UnknownBook(foreign));
        }

        debug!(user = name, email, "registered user");
        self.user_index.insert(email.to_owned(), self.users.len());
        self.users.push(user);
        for &book in initial_books {
            self.add_book_to_user(book, email, None)?;
        }
        Ok(())
    }

    /// Record that the user under `email` read `book`, forward the rating to
    /// the book and bump its read-count. An unknown email is reported and
    /// nothing changes
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::UnknownBook` for a foreign handle held by a
    /// registered user
    pub fn add_book_to_user(&mut self, book: BookId, email: &str, rating: Option<i32>) -> Result<(), CatalogError> {
        let Some(&user_idx) = self.user_index.get(email) else {
            self.notify(CatalogEvent::UnknownUser { email: email.to_owned() });
            return Ok(());
        };

        let scale = self.config.rating_scale;
        let entry = self.entry_mut(book)?;
        let rejected = entry.book.add_rating(rating, &scale);
        entry.read_count = entry.read_count.saturating_add(1);
        debug!(%book, email, ?rating, read_count = entry.read_count, "recorded read");
        if let Some(user) = self.users.get_mut(user_idx) {
            user.read_book(book, rating);
        }

        if let Some(event) = rejected {
            self.notify(event);
        }
        Ok(())
    }

    /// Move a user to a new address
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` for a malformed address, or a
    /// `CatalogError::EmailTaken` if another user holds it
    pub fn change_user_email(&mut self, email: &str, new_email: &str) -> Result<(), CatalogError> {
        let Some(&idx) = self.user_index.get(email) else {
            self.notify(CatalogEvent::UnknownUser { email: email.to_owned() });
            return Ok(());
        };
        if email != new_email && self.user_index.contains_key(new_email) {
            return Err(CatalogError::EmailTaken(new_email.to_owned()));
        }
        let Some(user) = self.users.get_mut(idx) else {
            return Ok(());
        };
        let event = user.change_email(new_email, &self.config.email_policy)?;
        self.user_index.remove(email);
        self.user_index.insert(new_email.to_owned(), idx);
        self.notify(event);
        Ok(())
    }

    /// The book with the highest read-count; ties go to the earliest
    /// registered
    #[must_use]
    pub fn most_read_book(&self) -> Option<BookId> {
        first_max_by(self.entries.iter().enumerate(), |(_, a), (_, b)| a.read_count.cmp(&b.read_count))
            .map(|(idx, _)| BookId::new(self.stamp, idx))
    }

    /// The book with the best average rating. Unrated books only count when
    /// no book is rated
    #[must_use]
    pub fn highest_rated_book(&self) -> Option<BookId> {
        best_average(self.books().map(|(id, book)| (id, book.average_rating())))
    }

    /// The user whose ratings average highest. Users who never rated only
    /// count when nobody has
    #[must_use]
    pub fn most_positive_user(&self) -> Option<&User> {
        best_average(self.users.iter().map(|user| (user, user.average_rating())))
    }

    /// Up to `n` books by descending read-count, ties in registration order
    #[must_use]
    pub fn n_most_read_books(&self, n: usize) -> Vec<BookId> {
        let mut ranked: Vec<(BookId, usize)> =
            self.entries.iter().enumerate().map(|(idx, entry)| (BookId::new(self.stamp, idx), entry.read_count)).collect();
        ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
        ranked.into_iter().take(n).map(|(id, _)| id).collect()
    }

    /// Up to `n` users by descending number of distinct books read, ties in
    /// registration order
    #[must_use]
    pub fn n_most_prolific_readers(&self, n: usize) -> Vec<&User> {
        let mut ranked: Vec<&User> = self.users.iter().collect();
        ranked.sort_by(|a, b| b.books_read().cmp(&a.books_read()));
        ranked.truncate(n);
        ranked
    }

    /// The first `n` books ordered by cost, cheapest first. The order is
    /// ascending even though the name suggests otherwise; callers rely on it
    #[must_use]
    pub fn n_most_expensive_books(&self, n: usize) -> Vec<BookId> {
        let mut ranked: Vec<(BookId, &Book)> = self.books().collect();
        ranked.sort_by(|(_, a), (_, b)| a.cost().total_cmp(&b.cost()));
        ranked.into_iter().take(n).map(|(id, _)| id).collect()
    }

    /// Summed cost of every book the user under `email` has read
    #[must_use]
    pub fn worth_of_user(&self, email: &str) -> UserWorth {
        match self.user(email) {
            Some(user) => UserWorth::Total(
                user.book_list().filter_map(|id| self.book(id)).map(Book::cost).sum(),
            ),
            None => UserWorth::UnknownUser(email.to_owned()),
        }
    }

    /// Number of books with at least one accepted rating
    #[must_use]
    pub fn rated_book_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.book.average_rating().is_some()).count()
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        if self.users.len() != other.users.len() || self.entries.len() != other.entries.len() {
            return false;
        }
        let users_match = self.users.iter().all(|user| other.user(user.email()) == Some(user));
        let counts: HashMap<BookKey, usize> =
            other.entries.iter().map(|entry| (entry.book.key(), entry.read_count)).collect();
        users_match
            && self.entries.iter().all(|entry| counts.get(&entry.book.key()) == Some(&entry.read_count))
    }
}

// Implementing display for nicer output
impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} users have rated {} books", self.users.len(), self.rated_book_count())
    }
}

// Include tests module
#[cfg(test)]
mod tests;
