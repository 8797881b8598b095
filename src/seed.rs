use medicine_tracker::db::{ensure_schema, init_db, DatabaseError, Snapshot};
use sqlx::PgPool;

const SEED_DATA: &str = include_str!("../data/seed.json");

fn get_seed_data() -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(SEED_DATA)
}

pub async fn seed_database(pool: &PgPool, seed: &Snapshot) -> Result<(), DatabaseError> {
    let mut transaction = pool.begin().await?;

    for medicine in &seed.medicines {
        sqlx::query(
            "INSERT INTO medicines (id, name, start_date, initial_stock, daily_dose, unit_per_box) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&medicine.id)
        .bind(&medicine.name)
        .bind(medicine.start_date)
        .bind(medicine.initial_stock)
        .bind(medicine.daily_dose)
        .bind(medicine.unit_per_box)
        .execute(&mut *transaction)
        .await?;
    }

    for entry in &seed.entries {
        sqlx::query(
            "INSERT INTO stock_entries (medicine_id, quantity, unit, date) \
             SELECT $1, $2, $3, $4 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM stock_entries \
                 WHERE medicine_id = $1 AND quantity = $2 AND unit = $3 AND date = $4 \
             )",
        )
        .bind(&entry.medicine_id)
        .bind(entry.quantity)
        .bind(entry.unit.as_str())
        .bind(entry.date)
        .execute(&mut *transaction)
        .await?;
    }

    transaction.commit().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = init_db(&database_url).await?;
    ensure_schema(&pool).await?;

    let seed = get_seed_data()?;
    seed_database(&pool, &seed).await?;

    log::info!(
        "Seeded {} medicines and {} stock entries",
        seed.medicines.len(),
        seed.entries.len()
    );
    Ok(())
}
