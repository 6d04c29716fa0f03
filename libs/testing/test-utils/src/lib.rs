//! Shared test utilities for the catalog crates
//!
//! - `TestDatabase`: PostgreSQL container with the workspace migrations applied
//! - `TestDataBuilder`: deterministic, per-test unique product data
//! - `assertions`: small assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_postgres_test");
//!
//!     let title = builder.title("main");
//!     let image = builder.image_url(1);
//! }
//! ```

mod postgres;

pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Titles and slugs are unique per seed, so tests sharing a database do not
/// trip over each other's unique indexes.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed derived from the test name
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// "Test Product <seed> <suffix>"
    pub fn title(&self, suffix: &str) -> String {
        format!("Test Product {} {}", self.seed, suffix)
    }

    /// The slug the catalog derives from [`TestDataBuilder::title`]
    pub fn slug(&self, suffix: &str) -> String {
        format!("test_product_{}_{}", self.seed, suffix.to_lowercase())
    }

    pub fn image_url(&self, n: usize) -> String {
        format!("https://cdn.example.com/{}/{}.jpg", self.seed, n)
    }

    pub fn image_urls(&self, count: usize) -> Vec<String> {
        (1..=count).map(|n| self.image_url(n)).collect()
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }
}
