use rust_decimal::Decimal;
use uuid::Uuid;

use axum_catalog_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_catalog(&pool).await?;

    println!("Seed completed");
    Ok(())
}

struct SeedProduct<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    price: &'a str,
    discount_percentage: &'a str,
    rating: f64,
    stock: i32,
    brand: &'a str,
    sku: &'a str,
    weight: f64,
    tags: &'a [&'a str],
    dimensions: Option<(f64, f64, f64)>,
    barcode: Option<i64>,
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        SeedProduct {
            title: "Essence Mascara Lash Princess",
            description: "Popular mascara known for its volumizing effects",
            category: "beauty",
            price: "9.99",
            discount_percentage: "7.17",
            rating: 4.94,
            stock: 5,
            brand: "Essence",
            sku: "RCH45Q1A",
            weight: 0.2,
            tags: &["beauty", "mascara"],
            dimensions: Some((23.17, 14.43, 28.01)),
            barcode: Some(9164035109868),
        },
        SeedProduct {
            title: "Eyeshadow Palette with Mirror",
            description: "Versatile range of eyeshadow shades with built-in mirror",
            category: "beauty",
            price: "19.99",
            discount_percentage: "5.50",
            rating: 3.28,
            stock: 44,
            brand: "Glamour Beauty",
            sku: "MVCFH27F",
            weight: 0.3,
            tags: &["beauty", "eyeshadow"],
            dimensions: Some((12.42, 8.63, 29.13)),
            barcode: Some(2817839095220),
        },
        SeedProduct {
            title: "Red Lipstick",
            description: "Classic and bold choice for adding a pop of color",
            category: "beauty",
            price: "12.99",
            discount_percentage: "19.03",
            rating: 2.51,
            stock: 68,
            brand: "Chic Cosmetics",
            sku: "YUIIIP4W",
            weight: 0.1,
            tags: &["beauty", "lipstick"],
            dimensions: None,
            barcode: None,
        },
    ];

    for seed in products {
        let product_id = ensure_product(pool, &seed).await?;
        for tag_name in seed.tags {
            let tag_id = ensure_tag(pool, tag_name).await?;
            sqlx::query(
                r#"
                INSERT INTO product_tags (product_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(product_id)
            .bind(tag_id)
            .execute(pool)
            .await?;
        }
        if let Some((width, height, depth)) = seed.dimensions {
            ensure_dimensions(pool, product_id, width, height, depth).await?;
        }
        if let Some(barcode) = seed.barcode {
            ensure_meta_info(pool, product_id, barcode).await?;
        }
        println!("Seeded product {}", seed.title);
    }

    Ok(())
}

async fn ensure_product(pool: &sqlx::PgPool, seed: &SeedProduct<'_>) -> anyhow::Result<Uuid> {
    let price: Decimal = seed.price.parse()?;
    let discount: Decimal = seed.discount_percentage.parse()?;

    sqlx::query(
        r#"
        INSERT INTO products (
            id, title, description, category, price, discount_percentage, rating,
            stock, brand, sku, weight, warranty_information, shipping_information,
            availability_status, return_policy, minimum_order_quantity, images, thumbnail
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        ON CONFLICT (sku) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(seed.title)
    .bind(seed.description)
    .bind(seed.category)
    .bind(price)
    .bind(discount)
    .bind(seed.rating)
    .bind(seed.stock)
    .bind(seed.brand)
    .bind(seed.sku)
    .bind(seed.weight)
    .bind("1 month warranty")
    .bind("Ships in 1-2 business days")
    .bind(if seed.stock > 0 { "In Stock" } else { "Out of Stock" })
    .bind("30 days return policy")
    .bind(1_i32)
    .bind(serde_json::json!([format!(
        "https://cdn.example.com/products/{}/1.png",
        seed.sku
    )]))
    .bind(format!(
        "https://cdn.example.com/products/{}/thumbnail.png",
        seed.sku
    ))
    .execute(pool)
    .await?;

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE sku = $1")
        .bind(seed.sku)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn ensure_tag(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tags (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn ensure_dimensions(
    pool: &sqlx::PgPool,
    product_id: Uuid,
    width: f64,
    height: f64,
    depth: f64,
) -> anyhow::Result<()> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM dimensions WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO dimensions (id, width, height, depth, product_id) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(width)
    .bind(height)
    .bind(depth)
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn ensure_meta_info(pool: &sqlx::PgPool, product_id: Uuid, barcode: i64) -> anyhow::Result<()> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM meta_info WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO meta_info (id, barcode, qr_code, product_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(barcode)
    .bind(format!("https://cdn.example.com/qr/{barcode}.png"))
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(())
}
