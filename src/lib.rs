//! In-memory book catalog and rating tracker.
//!
//! A [`Catalog`] registers books (plain, fiction or non-fiction) and
//! readers, records who read what with an optional rating, and answers
//! aggregate queries over the result: most-read book, highest-rated book,
//! most positive reader, most prolific readers and spend per reader.

pub mod book;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod observers;
pub mod report;
pub mod sample;
pub mod user;

pub use book::{Book, BookId, BookKey, BookKind};
pub use catalog::{Catalog, UserWorth};
pub use config::{CatalogConfig, EmailPolicy, RatingScale};
pub use error::CatalogError;
pub use events::CatalogEvent;
pub use observers::{CatalogObserver, NotificationService, TracingObserver};
pub use report::CatalogReport;
pub use user::{User, UserKey};
