use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Inclusive range of ratings a book accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RatingScale {
    /// Lowest accepted rating
    pub min: i32,
    /// Highest accepted rating
    pub max: i32,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 0, max: 4 }
    }
}

impl RatingScale {
    /// Whether `rating` falls inside the scale
    #[must_use]
    pub fn contains(&self, rating: i32) -> bool {
        (self.min..=self.max).contains(&rating)
    }
}

/// Rules an email address has to satisfy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmailPolicy {
    /// Suffixes, starting at the final `.`, that an address may end in
    pub allowed_suffixes: Vec<String>,
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self { allowed_suffixes: [".com", ".edu", ".org"].map(String::from).to_vec() }
    }
}

impl EmailPolicy {
    /// Check an address: it needs an `@`, and everything from its last `.`
    /// onwards must be one of the allowed suffixes
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Validation` naming the `email` field
    pub fn validate(&self, email: &str) -> Result<(), CatalogError> {
        if !email.contains('@') {
            return Err(CatalogError::validation("email", format!("{email} has no '@'")));
        }
        let suffix = email.rfind('.').and_then(|dot| email.get(dot..));
        match suffix {
            Some(suffix) if self.allowed_suffixes.iter().any(|allowed| allowed == suffix) => Ok(()),
            _ => Err(CatalogError::validation(
                "email",
                format!("{email} must end in one of {}", self.allowed_suffixes.join(", ")),
            )),
        }
    }
}

/// Tunables for a [`crate::Catalog`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Range accepted by `Book::add_rating`
    pub rating_scale: RatingScale,
    /// Address rules for users
    pub email_policy: EmailPolicy,
    /// Maximum number of notifications kept in the catalog history
    pub max_history_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            rating_scale: RatingScale::default(),
            email_policy: EmailPolicy::default(),
            max_history_size: 100,
        }
    }
}

impl CatalogConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::Config` if the JSON is malformed or describes
    /// an empty rating scale
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))?;
        if config.rating_scale.min > config.rating_scale.max {
            return Err(CatalogError::Config(format!(
                "rating scale minimum {} exceeds maximum {}",
                config.rating_scale.min, config.rating_scale.max
            )));
        }
        Ok(config)
    }
}
