use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use aromance_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_staff(&pool, "admin@example.com", "admin123").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_staff(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, is_anonymous)
        VALUES ($1, $2, $3, false)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If the account already exists, fetch its id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured staff account {email}");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products: Vec<(&str, &str, &str, i64, i32, Vec<&str>)> = vec![
        (
            "Sea Breeze",
            "Maison Azur",
            "Citrus top notes over an oceanic heart, light and fresh",
            45_000,
            0,
            vec!["fresh", "citrus"],
        ),
        (
            "Oud Nights",
            "Dar Al Noir",
            "Deep smoky oud with warm amber and a trace of rose",
            120_000,
            10,
            vec!["oriental", "woody"],
        ),
        (
            "Jasmine Veil",
            "Fleur Blanche",
            "Soft white florals with a powdery musk base",
            60_000,
            0,
            vec!["floral"],
        ),
        (
            "Amber Rose",
            "Dar Al Noir",
            "Velvety rose wrapped in golden amber",
            85_000,
            25,
            vec!["floral", "oriental"],
        ),
    ];

    for (name, brand, description, price_cents, discount_percent, categories) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, brand, description, price_cents, discount_percent, categories)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(brand)
        .bind(description)
        .bind(price_cents)
        .bind(discount_percent)
        .bind(categories.iter().map(|s| (*s).to_string()).collect::<Vec<String>>())
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
