//! Catalog seeding command.
//!
//! Inserts a small sample catalog for local development. Running it twice
//! inserts the products twice; it makes no attempt at idempotence.

use rust_decimal::Decimal;

use emberline_server::db::products::ProductRepository;
use emberline_server::models::ProductInput;

use super::migrate::CommandError;

fn sample_products() -> Vec<ProductInput> {
    vec![
        ProductInput {
            name: "Brass Diya".to_string(),
            price: Decimal::from(450),
            description: "Hand-cast brass oil lamp with a matte finish.".to_string(),
            images: vec!["/images/brass-diya.jpg".to_string()],
            features: vec![
                "Solid brass".to_string(),
                "Holds 40ml of oil".to_string(),
            ],
        },
        ProductInput {
            name: "Block-Print Table Runner".to_string(),
            price: Decimal::from(899),
            description: "Cotton runner, hand block-printed in indigo.".to_string(),
            images: vec!["/images/table-runner.jpg".to_string()],
            features: vec![
                "100% cotton".to_string(),
                "180cm x 40cm".to_string(),
                "Cold wash".to_string(),
            ],
        },
        ProductInput {
            name: "Terracotta Planter".to_string(),
            price: Decimal::from(650),
            description: "Wheel-thrown terracotta planter with drainage hole.".to_string(),
            images: vec!["/images/terracotta-planter.jpg".to_string()],
            features: vec!["Frost-safe".to_string(), "20cm diameter".to_string()],
        },
    ]
}

/// Insert the sample catalog.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);

    for input in sample_products() {
        let product = repo.create(&input).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "seeded product");
    }

    tracing::info!("Catalog seeded");
    Ok(())
}
