use crate::{catalog::Catalog, error::CatalogError};

/// Fill `catalog` with the demonstration data set: six books, three readers
/// and their ratings
///
/// # Errors
///
/// Returns the first `CatalogError` raised, which can only happen if the
/// catalog already holds conflicting books or uses a stricter configuration
pub fn populate(catalog: &mut Catalog) -> Result<(), CatalogError> {
    let society = catalog.create_book("Society of Mind", 12_345_678, 12.86)?;
    let alice = catalog.create_novel("Alice In Wonderland", "Lewis Carroll", 12345, 7.11)?;
    catalog.set_book_isbn(alice, 9_781_536_831_139)?;
    let automate =
        catalog.create_non_fiction("Automate the Boring Stuff", "Python", "beginner", 1_929_452, 17.99)?;
    let turing = catalog.create_non_fiction(
        "Computing Machinery and Intelligence",
        "AI",
        "advanced",
        11_111_938,
        31.72,
    )?;
    let diamond = catalog.create_novel("The Diamond Age", "Neal Stephenson", 10_101_010, 73.68)?;
    let rains = catalog.create_novel("There Will Come Soft Rains", "Ray Bradbury", 10_001_000, 3.35)?;

    catalog.add_user("Alan Turing", "alan@turing.com", &[])?;
    catalog.add_user("David Marr", "david@computation.org", &[])?;
    catalog.add_user("Marvin Minsky", "marvin@mit.edu", &[society, alice, automate])?;

    let ratings = [
        (society, "alan@turing.com", 1),
        (alice, "alan@turing.com", 3),
        (automate, "alan@turing.com", 3),
        (turing, "alan@turing.com", 4),
        (rains, "alan@turing.com", 1),
        (diamond, "marvin@mit.edu", 2),
        (rains, "marvin@mit.edu", 2),
        (rains, "david@computation.org", 4),
    ];
    for (book, email, rating) in ratings {
        catalog.add_book_to_user(book, email, Some(rating))?;
    }
    Ok(())
}
