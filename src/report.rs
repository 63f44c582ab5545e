//! Rendering of catalog contents and query results.
//!
//! The catalog itself only hands out handles, entities and numbers. This
//! module turns a snapshot of it into text lines or a serializable report.

use serde::Serialize;

use crate::{
    book::BookId,
    catalog::{Catalog, UserWorth},
};

/// One line per registered book, in registration order
#[must_use]
pub fn catalog_listing(catalog: &Catalog) -> Vec<String> {
    catalog.books().map(|(_, book)| book.to_string()).collect()
}

/// One line per registered user, in registration order
#[must_use]
pub fn user_listing(catalog: &Catalog) -> Vec<String> {
    catalog.users().map(ToString::to_string).collect()
}

/// Display form of the books behind `ids`, skipping foreign handles
fn describe(catalog: &Catalog, ids: &[BookId]) -> Vec<String> {
    ids.iter().filter_map(|&id| catalog.book(id)).map(ToString::to_string).collect()
}

/// Spend of one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSpend {
    /// The user's address
    pub email: String,
    /// Summed cost of the books they read
    pub worth: UserWorth,
}

/// Snapshot of every query the catalog answers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogReport {
    /// One-line summary of the catalog
    pub summary: String,
    /// Every book
    pub books: Vec<String>,
    /// Every user
    pub users: Vec<String>,
    /// The user whose ratings average highest
    pub most_positive_user: Option<String>,
    /// The book with the best average rating
    pub highest_rated_book: Option<String>,
    /// The book with the most association events
    pub most_read_book: Option<String>,
    /// Top books by read-count
    pub most_read_books: Vec<String>,
    /// Top users by books read
    pub most_prolific_readers: Vec<String>,
    /// First books by cost, cheapest first
    pub most_expensive_books: Vec<String>,
    /// Spend of every user
    pub spend: Vec<UserSpend>,
}

impl CatalogReport {
    /// Run every query against `catalog`, keeping `top` entries for the
    /// ranked ones
    #[must_use]
    pub fn build(catalog: &Catalog, top: usize) -> Self {
        Self {
            summary: catalog.to_string(),
            books: catalog_listing(catalog),
            users: user_listing(catalog),
            most_positive_user: catalog.most_positive_user().map(ToString::to_string),
            highest_rated_book: catalog
                .highest_rated_book()
                .and_then(|id| catalog.book(id))
                .map(ToString::to_string),
            most_read_book: catalog.most_read_book().and_then(|id| catalog.book(id)).map(ToString::to_string),
            most_read_books: describe(catalog, &catalog.n_most_read_books(top)),
            most_prolific_readers: catalog
                .n_most_prolific_readers(top)
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            most_expensive_books: describe(catalog, &catalog.n_most_expensive_books(top)),
            spend: catalog
                .users()
                .map(|user| UserSpend {
                    email: user.email().to_owned(),
                    worth: catalog.worth_of_user(user.email()),
                })
                .collect(),
        }
    }

    /// The report as titled sections of text lines, in display order
    #[must_use]
    pub fn sections(&self) -> Vec<(&'static str, Vec<String>)> {
        /// Render an optional answer, with a marker when there is none
        fn single(value: Option<&str>) -> Vec<String> {
            vec![value.unwrap_or("None").to_owned()]
        }

        vec![
            ("Catalog", self.books.clone()),
            ("Users", self.users.clone()),
            ("Most positive user", single(self.most_positive_user.as_deref())),
            ("Highest rated book", single(self.highest_rated_book.as_deref())),
            ("Most read book", single(self.most_read_book.as_deref())),
            ("Most read books", self.most_read_books.clone()),
            ("Most prolific readers", self.most_prolific_readers.clone()),
            ("Most expensive books", self.most_expensive_books.clone()),
            (
                "Worth of users",
                self.spend.iter().map(|spend| format!("{}: {}", spend.email, spend.worth)).collect(),
            ),
        ]
    }

    /// The report as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    /// Small catalog with one novel, one manual and one reader
    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        let Ok(novel) = catalog.create_novel("The Diamond Age", "Neal Stephenson", 10_101_010, 73.68) else {
            panic!("valid novel");
        };
        let Ok(manual) = catalog.create_non_fiction("Automate the Boring Stuff", "Python", "beginner", 1_929_452, 17.99)
        else {
            panic!("valid manual");
        };
        assert!(catalog.add_user("Marvin Minsky", "marvin@mit.edu", &[manual]).is_ok());
        assert!(catalog.add_book_to_user(novel, "marvin@mit.edu", Some(2)).is_ok());
        catalog
    }

    #[test]
    fn listings_use_display_forms() {
        let catalog = sample();
        assert_eq!(
            catalog_listing(&catalog),
            vec![
                "The Diamond Age by Neal Stephenson".to_owned(),
                "Automate the Boring Stuff, a beginner manual on Python".to_owned(),
            ]
        );
        assert_eq!(
            user_listing(&catalog),
            vec!["User Marvin Minsky with email marvin@mit.edu has read 2 books".to_owned()]
        );
    }

    #[test]
    fn report_collects_every_query() {
        let report = CatalogReport::build(&sample(), 1);

        assert_eq!(report.summary, "1 users have rated 1 books");
        assert_eq!(report.highest_rated_book.as_deref(), Some("The Diamond Age by Neal Stephenson"));
        assert_eq!(report.most_read_book.as_deref(), Some("The Diamond Age by Neal Stephenson"));
        assert_eq!(report.most_expensive_books, vec!["Automate the Boring Stuff, a beginner manual on Python"]);
        assert_eq!(report.spend.len(), 1);
        assert!(matches!(
            report.spend.first(),
            Some(UserSpend { email, worth: UserWorth::Total(total) })
                if email == "marvin@mit.edu" && (total - 91.67).abs() < 1e-9
        ));
    }

    #[test]
    fn empty_catalog_renders_none_markers() {
        let report = CatalogReport::build(&Catalog::new(), 3);
        let sections = report.sections();

        assert_eq!(sections.len(), 9);
        assert!(sections.iter().any(|(title, lines)| *title == "Most read book" && lines == &vec!["None".to_owned()]));
    }

    #[test]
    fn json_has_named_fields() {
        let json = CatalogReport::build(&sample(), 2).to_json();
        assert!(matches!(json, Ok(ref text) if text.contains("\"most_positive_user\": \"User Marvin Minsky")));
    }
}
