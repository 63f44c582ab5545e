#![allow(clippy::panic, clippy::float_cmp)]

use rstest::rstest;

use crate::{
    book::{Book, BookId},
    catalog::{Catalog, UserWorth},
    config::{CatalogConfig, RatingScale},
    error::CatalogError,
    events::CatalogEvent,
    observers::NotificationService,
};

/// Unwrap a catalog result, failing the test with the error
fn ok<T>(result: Result<T, CatalogError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("unexpected catalog error: {e}"),
    }
}

/// Two books and one user who read both: A(isbn 1, cost 10) rated 3 and
/// B(isbn 2, cost 5) rated 1
fn setup_test_catalog() -> (Catalog, BookId, BookId) {
    let mut catalog = Catalog::new();
    let a = ok(catalog.create_book("A", 1, 10.0));
    let b = ok(catalog.create_book("B", 2, 5.0));
    ok(catalog.add_user("Test User", "test@user.com", &[]));
    ok(catalog.add_book_to_user(a, "test@user.com", Some(3)));
    ok(catalog.add_book_to_user(b, "test@user.com", Some(1)));
    (catalog, a, b)
}

#[test]
fn test_two_book_scenario() {
    let (catalog, a, _) = setup_test_catalog();

    assert_eq!(catalog.most_read_book(), Some(a));
    assert_eq!(catalog.highest_rated_book(), Some(a));
    assert_eq!(catalog.worth_of_user("test@user.com"), UserWorth::Total(15.0));
    assert_eq!(catalog.to_string(), "1 users have rated 2 books");
}

#[test]
fn test_duplicate_isbn_with_other_title_is_rejected() {
    let mut catalog = Catalog::new();
    ok(catalog.create_book("Society of Mind", 12_345_678, 12.86));

    let result = catalog.create_novel("The Diamond Age", "Neal Stephenson", 12_345_678, 73.68);
    assert_eq!(
        result,
        Err(CatalogError::DuplicateIsbn {
            isbn: 12_345_678,
            existing: "Society of Mind".to_owned(),
            attempted: "The Diamond Age".to_owned(),
        })
    );
    assert_eq!(catalog.books().len(), 1);
}

#[test]
fn test_same_identity_is_idempotent() {
    let (mut catalog, a, _) = setup_test_catalog();

    let again = ok(catalog.create_book("A", 1, 99.0));
    assert_eq!(again, a);
    assert_eq!(catalog.books().len(), 2);
    assert_eq!(catalog.read_count(a), Some(1));
    assert_eq!(catalog.book(a).map(|b| b.cost()), Some(10.0));
}

#[test]
fn test_invalid_arguments_register_nothing() {
    let mut catalog = Catalog::new();
    assert!(matches!(catalog.create_book("", 1, 1.0), Err(CatalogError::Validation { .. })));
    assert!(matches!(
        catalog.create_non_fiction("Manual", "Rust", "", 2, 1.0),
        Err(CatalogError::Validation { field: "level", .. })
    ));
    assert!(matches!(
        catalog.add_user("Alan Turing", "alan@turing", &[]),
        Err(CatalogError::Validation { field: "email", .. })
    ));
    assert_eq!(catalog.books().len(), 0);
    assert_eq!(catalog.users().len(), 0);
}

#[test]
fn test_unknown_email_changes_nothing() {
    let (mut catalog, a, _) = setup_test_catalog();
    let before = catalog.read_count(a);

    ok(catalog.add_book_to_user(a, "nobody@nowhere.com", Some(4)));

    assert_eq!(catalog.read_count(a), before);
    assert_eq!(catalog.book(a).map(|b| b.ratings().len()), Some(1));
    assert_eq!(catalog.users().len(), 1);
    assert_eq!(
        catalog.history().back(),
        Some(&CatalogEvent::UnknownUser { email: "nobody@nowhere.com".to_owned() })
    );
}

#[test]
fn test_duplicate_user_is_reported_not_raised() {
    let (mut catalog, a, _) = setup_test_catalog();

    ok(catalog.add_user("Someone Else", "test@user.com", &[a]));

    assert_eq!(catalog.users().len(), 1);
    assert_eq!(catalog.user("test@user.com").map(|u| u.name()), Some("Test User"));
    assert_eq!(catalog.read_count(a), Some(1));
    assert_eq!(
        catalog.history().back(),
        Some(&CatalogEvent::DuplicateUser { email: "test@user.com".to_owned() })
    );
}

#[test]
fn test_foreign_handle_is_an_error() {
    let (mut catalog, _, _) = setup_test_catalog();
    let foreign = BookId::new(catalog.stamp, 42);

    assert_eq!(
        catalog.add_book_to_user(foreign, "test@user.com", None),
        Err(CatalogError::UnknownBook(foreign))
    );
    assert_eq!(
        catalog.add_user("New Reader", "new@reader.org", &[foreign]),
        Err(CatalogError::UnknownBook(foreign))
    );
    assert!(catalog.user("new@reader.org").is_none());
}

#[test]
fn test_handle_from_another_catalog_is_refused() {
    let mut one = Catalog::new();
    let a = ok(one.create_book("A", 1, 10.0));

    let mut two = Catalog::new();
    let z = ok(two.create_book("Z", 26, 99.0));
    ok(two.add_user("Reader", "r@r.com", &[]));
    assert_eq!(a.index(), z.index());

    assert_eq!(two.add_book_to_user(a, "r@r.com", Some(4)), Err(CatalogError::UnknownBook(a)));
    assert_eq!(two.set_book_cost(a, 1.0), Err(CatalogError::UnknownBook(a)));
    assert_eq!(two.set_book_isbn(a, 2), Err(CatalogError::UnknownBook(a)));
    assert!(two.book(a).is_none());
    assert_eq!(two.read_count(a), None);
    assert_eq!(two.read_count(z), Some(0));
    assert_eq!(two.book(z).map(Book::ratings), Some(&[][..]));
    assert_eq!(two.worth_of_user("r@r.com"), UserWorth::Total(0.0));
}

#[test]
fn test_unknown_email_is_reported_before_the_handle_is_checked() {
    let (mut catalog, _, _) = setup_test_catalog();
    let foreign = ok(Catalog::new().create_book("Elsewhere", 9, 1.0));

    assert_eq!(catalog.add_book_to_user(foreign, "nobody@nowhere.com", Some(2)), Ok(()));
    assert_eq!(
        catalog.history().back(),
        Some(&CatalogEvent::UnknownUser { email: "nobody@nowhere.com".to_owned() })
    );
}

#[test]
fn test_register_refuses_ratings_outside_the_scale() {
    let mut book = ok(Book::new("Rated Elsewhere", 5, 1.0));
    assert!(book.add_rating(Some(9), &RatingScale { min: 0, max: 10 }).is_none());

    let mut catalog = Catalog::new();
    match catalog.register(book.clone()) {
        Err(CatalogError::Validation { field, .. }) => assert_eq!(field, "ratings"),
        other => panic!("expected a ratings validation error, got {other:?}"),
    }
    assert_eq!(catalog.books().len(), 0);

    let config = CatalogConfig { rating_scale: RatingScale { min: 0, max: 10 }, ..CatalogConfig::default() };
    let mut wide = Catalog::with_config(config);
    let id = ok(wide.register(book));
    assert_eq!(wide.book(id).and_then(Book::average_rating), Some(9.0));
}

#[test]
fn test_initial_books_match_explicit_associations() {
    let mut seeded = Catalog::new();
    let b1 = ok(seeded.create_book("One", 1, 1.0));
    let b2 = ok(seeded.create_book("Two", 2, 2.0));
    ok(seeded.add_user("Marvin Minsky", "marvin@mit.edu", &[b1, b2]));

    let mut manual = Catalog::new();
    let m1 = ok(manual.create_book("One", 1, 1.0));
    let m2 = ok(manual.create_book("Two", 2, 2.0));
    ok(manual.add_user("Marvin Minsky", "marvin@mit.edu", &[]));
    ok(manual.add_book_to_user(m1, "marvin@mit.edu", None));
    ok(manual.add_book_to_user(m2, "marvin@mit.edu", None));

    assert_eq!(seeded, manual);

    ok(manual.add_book_to_user(m1, "marvin@mit.edu", None));
    assert_ne!(seeded, manual);
}

#[test]
fn test_out_of_range_rating_is_dropped_but_counted_as_read() {
    let (mut catalog, a, _) = setup_test_catalog();

    ok(catalog.add_book_to_user(a, "test@user.com", Some(9)));

    assert_eq!(catalog.read_count(a), Some(2));
    assert_eq!(catalog.book(a).and_then(|b| b.average_rating()), Some(3.0));
    assert_eq!(
        catalog.history().back(),
        Some(&CatalogEvent::InvalidRating { title: "A".to_owned(), rating: 9 })
    );
}

#[test]
fn test_repeat_associations_inflate_read_count_not_worth() {
    let (mut catalog, a, _) = setup_test_catalog();

    ok(catalog.add_book_to_user(a, "test@user.com", Some(2)));
    ok(catalog.add_book_to_user(a, "test@user.com", None));

    assert_eq!(catalog.read_count(a), Some(3));
    assert_eq!(catalog.worth_of_user("test@user.com"), UserWorth::Total(15.0));
    let ledger = catalog.user("test@user.com").map(|u| u.book_list().count());
    assert_eq!(ledger, Some(2));
}

#[test]
fn test_worth_of_unknown_user() {
    let catalog = Catalog::new();
    assert_eq!(
        catalog.worth_of_user("ghost@nowhere.org"),
        UserWorth::UnknownUser("ghost@nowhere.org".to_owned())
    );
}

#[test]
fn test_empty_catalog_queries() {
    let catalog = Catalog::new();
    assert_eq!(catalog.most_read_book(), None);
    assert_eq!(catalog.highest_rated_book(), None);
    assert!(catalog.most_positive_user().is_none());
    assert!(catalog.n_most_read_books(3).is_empty());
    assert!(catalog.n_most_prolific_readers(3).is_empty());
    assert!(catalog.n_most_expensive_books(3).is_empty());
}

#[test]
fn test_unrated_books_lose_to_rated_ones() {
    let mut catalog = Catalog::new();
    let unrated = ok(catalog.create_book("Unrated", 1, 1.0));
    let low = ok(catalog.create_book("Low", 2, 1.0));
    assert_eq!(catalog.highest_rated_book(), Some(unrated));

    ok(catalog.add_user("Reader", "reader@books.org", &[]));
    ok(catalog.add_book_to_user(low, "reader@books.org", Some(0)));
    assert_eq!(catalog.highest_rated_book(), Some(low));
}

#[test]
fn test_most_positive_user() {
    let (mut catalog, a, b) = setup_test_catalog();
    ok(catalog.add_user("Quiet Reader", "quiet@reader.org", &[a]));
    ok(catalog.add_user("Happy Reader", "happy@reader.org", &[]));
    ok(catalog.add_book_to_user(b, "happy@reader.org", Some(4)));

    assert_eq!(catalog.most_positive_user().map(|u| u.email()), Some("happy@reader.org"));
}

#[test]
fn test_most_positive_user_ties_go_to_first_registered() {
    let (mut catalog, a, _) = setup_test_catalog();
    ok(catalog.add_user("Second Reader", "second@reader.org", &[]));
    ok(catalog.add_book_to_user(a, "second@reader.org", Some(2)));

    assert_eq!(catalog.most_positive_user().map(|u| u.email()), Some("test@user.com"));
}

#[rstest]
#[case::zero(0, vec![])]
#[case::one(1, vec![2])]
#[case::all(3, vec![2, 0, 1])]
#[case::clamped(10, vec![2, 0, 1])]
fn test_n_most_read_books(#[case] n: usize, #[case] expected: Vec<usize>) {
    let mut catalog = Catalog::new();
    let first = ok(catalog.create_book("First", 1, 1.0));
    let second = ok(catalog.create_book("Second", 2, 1.0));
    let third = ok(catalog.create_book("Third", 3, 1.0));
    ok(catalog.add_user("Reader", "reader@books.org", &[first, second, third]));
    ok(catalog.add_book_to_user(third, "reader@books.org", Some(1)));

    let ranked: Vec<usize> = catalog.n_most_read_books(n).into_iter().map(BookId::index).collect();
    assert_eq!(ranked, expected);
}

#[test]
fn test_n_most_prolific_readers_is_stable() {
    let (mut catalog, a, b) = setup_test_catalog();
    ok(catalog.add_user("One Book", "one@book.org", &[a]));
    ok(catalog.add_user("Two Books", "two@books.org", &[a, b]));
    ok(catalog.add_user("No Books", "no@books.org", &[]));

    let emails: Vec<&str> = catalog.n_most_prolific_readers(10).into_iter().map(|u| u.email()).collect();
    assert_eq!(emails, vec!["test@user.com", "two@books.org", "one@book.org", "no@books.org"]);
    assert_eq!(catalog.n_most_prolific_readers(1).len(), 1);
}

#[test]
fn test_n_most_expensive_books_sorts_ascending() {
    let mut catalog = Catalog::new();
    let pricey = ok(catalog.create_book("Pricey", 1, 73.68));
    let cheap = ok(catalog.create_book("Cheap", 2, 3.35));
    let middle = ok(catalog.create_book("Middle", 3, 12.86));
    let also_cheap = ok(catalog.create_book("Also Cheap", 4, 3.35));

    assert_eq!(catalog.n_most_expensive_books(99), vec![cheap, also_cheap, middle, pricey]);
    assert_eq!(catalog.n_most_expensive_books(2), vec![cheap, also_cheap]);
}

#[test]
fn test_set_book_isbn_keeps_isbns_unique() {
    let (mut catalog, a, b) = setup_test_catalog();

    assert!(matches!(catalog.set_book_isbn(a, 2), Err(CatalogError::DuplicateIsbn { isbn: 2, .. })));
    assert_eq!(catalog.book(a).map(|book| book.isbn()), Some(1));

    ok(catalog.set_book_isbn(b, 9_781_536_831_139));
    assert_eq!(catalog.book(b).map(|book| book.isbn()), Some(9_781_536_831_139));
    assert_eq!(
        catalog.history().back(),
        Some(&CatalogEvent::IsbnChanged { title: "B".to_owned(), isbn: 9_781_536_831_139 })
    );

    // the user's ledger follows the handle, not the old isbn
    assert_eq!(catalog.worth_of_user("test@user.com"), UserWorth::Total(15.0));
}

#[test]
fn test_set_book_cost_updates_worth() {
    let (mut catalog, a, _) = setup_test_catalog();

    assert!(catalog.set_book_cost(a, -1.0).is_err());
    ok(catalog.set_book_cost(a, 20.0));

    assert_eq!(catalog.worth_of_user("test@user.com"), UserWorth::Total(25.0));
}

#[test]
fn test_change_user_email_rekeys_user() {
    let (mut catalog, a, _) = setup_test_catalog();
    ok(catalog.add_user("Other Reader", "other@reader.org", &[]));

    assert_eq!(
        catalog.change_user_email("test@user.com", "other@reader.org"),
        Err(CatalogError::EmailTaken("other@reader.org".to_owned()))
    );
    assert!(catalog.change_user_email("test@user.com", "bad-address").is_err());

    ok(catalog.change_user_email("test@user.com", "test@user.edu"));
    assert!(catalog.user("test@user.com").is_none());
    assert_eq!(catalog.worth_of_user("test@user.edu"), UserWorth::Total(15.0));

    ok(catalog.add_book_to_user(a, "test@user.edu", None));
    assert_eq!(catalog.read_count(a), Some(2));
    assert_eq!(
        catalog.history().back(),
        Some(&CatalogEvent::EmailChanged {
            first_name: "Test".to_owned(),
            email: "test@user.edu".to_owned()
        })
    );
}

#[test]
fn test_observers_see_every_event() {
    let mut catalog = Catalog::new();
    let service = NotificationService::new();
    catalog.register_observer(Box::new(service.clone()));

    let book = ok(catalog.create_book("A", 1, 1.0));
    ok(catalog.add_book_to_user(book, "ghost@nowhere.org", None));
    ok(catalog.add_user("Reader", "reader@books.org", &[]));
    ok(catalog.add_user("Reader", "reader@books.org", &[]));

    assert_eq!(
        service.drain(),
        vec![
            "No user with email ghost@nowhere.org!".to_owned(),
            "User with email reader@books.org already exists".to_owned(),
        ]
    );
}

#[test]
fn test_history_is_bounded() {
    let config = CatalogConfig { max_history_size: 2, ..CatalogConfig::default() };
    let mut catalog = Catalog::with_config(config);
    let book = ok(catalog.create_book("A", 1, 1.0));

    for email in ["one@x.com", "two@x.com", "three@x.com"] {
        ok(catalog.add_book_to_user(book, email, None));
    }

    let kept: Vec<String> = catalog.history().iter().map(ToString::to_string).collect();
    assert_eq!(kept, vec!["No user with email two@x.com!", "No user with email three@x.com!"]);
}

#[test]
fn test_custom_rating_scale() {
    let json = r#"{"rating_scale": {"min": 1, "max": 10}}"#;
    let mut catalog = Catalog::with_config(ok(CatalogConfig::from_json(json)));
    let book = ok(catalog.create_book("A", 1, 1.0));
    ok(catalog.add_user("Reader", "reader@books.org", &[]));

    ok(catalog.add_book_to_user(book, "reader@books.org", Some(10)));
    ok(catalog.add_book_to_user(book, "reader@books.org", Some(0)));

    assert_eq!(catalog.book(book).map(|b| b.ratings().to_vec()), Some(vec![10]));
}

#[test]
fn test_catalog_can_be_shared_behind_a_lock() {
    let (mut catalog, a, _) = setup_test_catalog();
    catalog.register_observer(Box::new(NotificationService::new()));
    let shared = std::sync::RwLock::new(catalog);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            if let Ok(mut writer) = shared.write() {
                ok(writer.add_book_to_user(a, "test@user.com", Some(4)));
            }
        });
    });

    let read_count = shared.read().ok().and_then(|reader| reader.read_count(a));
    assert_eq!(read_count, Some(2));
}
