//! Demo catalog and users.
//!
//! Seeded entities carry fixed IDs so that demos and tests can refer to them.
//! The user IDs match the auth credential table in
//! [`crate::services::auth`], so a logged-in demo user owns real store data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bazaar_core::{Address, CategoryId, Email, EmailError, Price, PriceError, ProductId, UserId};

use super::MemoryStore;
use crate::models::{Category, Product, User};

pub const ELECTRONICS_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f9a001";
pub const LAPTOPS_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f9a002";
pub const SMARTPHONES_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f9a003";
pub const CLOTHING_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f9a004";

pub const MACBOOK_ID: &str = "9b2f3c1e-5d4a-4e8b-9c7d-0a1b2c3db001";
pub const IPHONE_ID: &str = "9b2f3c1e-5d4a-4e8b-9c7d-0a1b2c3db002";
pub const TSHIRT_ID: &str = "9b2f3c1e-5d4a-4e8b-9c7d-0a1b2c3db003";

pub const ALICE_ID: &str = "550e8400-e29b-41d4-a716-446655440001";
pub const BOB_ID: &str = "550e8400-e29b-41d4-a716-446655440002";

/// Errors building the demo data set. Only reachable if the constants above
/// are edited into something invalid.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid seed price: {0}")]
    Price(#[from] PriceError),

    #[error("invalid seed email: {0}")]
    Email(#[from] EmailError),
}

impl MemoryStore {
    /// A store pre-populated with the demo catalog and users.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] if a seeded price or email fails validation.
    pub fn with_demo_data() -> Result<Self, SeedError> {
        let store = Self::new();
        seed(&store, Utc::now())?;
        Ok(store)
    }
}

/// Load the demo data set into `store`, stamping every entity with `now`.
///
/// # Errors
///
/// Returns [`SeedError`] if a seeded price or email fails validation.
pub fn seed(store: &MemoryStore, now: DateTime<Utc>) -> Result<(), SeedError> {
    let category = |id: &str, name: &str, parent: Option<&str>| Category {
        id: CategoryId::new(id),
        name: name.to_owned(),
        parent_id: parent.map(CategoryId::new),
        created_at: now,
        updated_at: now,
    };

    store.create_category(category(ELECTRONICS_ID, "Electronics", None));
    store.create_category(category(LAPTOPS_ID, "Laptops", Some(ELECTRONICS_ID)));
    store.create_category(category(SMARTPHONES_ID, "Smartphones", Some(ELECTRONICS_ID)));
    store.create_category(category(CLOTHING_ID, "Clothing", None));

    let products = [
        (
            MACBOOK_ID,
            "MacBook Pro 16\"",
            "Apple MacBook Pro with M3 chip",
            249_999,
            10,
            LAPTOPS_ID,
            "https://example.com/macbook.jpg",
        ),
        (
            IPHONE_ID,
            "iPhone 15 Pro",
            "Latest iPhone with titanium design",
            99_999,
            25,
            SMARTPHONES_ID,
            "https://example.com/iphone.jpg",
        ),
        (
            TSHIRT_ID,
            "T-Shirt",
            "Comfortable cotton t-shirt",
            2_999,
            100,
            CLOTHING_ID,
            "https://example.com/tshirt.jpg",
        ),
    ];

    for (id, name, description, cents, stock, category_id, image) in products {
        store.create_product(Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::new(Decimal::new(cents, 2))?,
            stock,
            category_id: CategoryId::new(category_id),
            image_urls: vec![image.to_owned()],
            created_at: now,
            updated_at: now,
        });
    }

    let users = [
        (
            ALICE_ID,
            "alice@example.com",
            "Alice Johnson",
            Address {
                street: "123 Test St".to_owned(),
                city: "Test City".to_owned(),
                state: "TC".to_owned(),
                postal_code: "12345".to_owned(),
                country: "USA".to_owned(),
            },
        ),
        (
            BOB_ID,
            "bob@example.com",
            "Bob Smith",
            Address {
                street: "456 Demo Ave".to_owned(),
                city: "Demo City".to_owned(),
                state: "DC".to_owned(),
                postal_code: "67890".to_owned(),
                country: "USA".to_owned(),
            },
        ),
    ];

    for (id, email, name, address) in users {
        store.create_user(User {
            id: UserId::new(id),
            email: Email::parse(email)?,
            name: name.to_owned(),
            address: Some(address),
            created_at: now,
            updated_at: now,
        });
    }

    tracing::debug!(
        categories = 4,
        products = 3,
        users = 2,
        "Seeded demo data"
    );

    Ok(())
}
