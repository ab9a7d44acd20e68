use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fulfill_core::calculations::{CustomRequirementsForm, StandardFulfillmentInput};
use fulfill_core::{
    CustomRequirementsState, FulfillmentRepository, NewQuoteRequest, QuoteRequest, RateCard,
    RepositoryError, StandardFulfillmentState,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_count, get_decimal};

/// Connection string that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects with a sqlx URL such as `sqlite:fulfillment.db?mode=rwc`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    /// Opens a database file, creating it if needed, or an in-memory
    /// database for [`IN_MEMORY`].
    pub async fn open(connection_string: &str) -> Result<Self> {
        let pool = if connection_string == IN_MEMORY {
            // Every connection would get its own empty database, so keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await
                .context("Failed to open in-memory database")?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(connection_string)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .connect_with(options)
                .await
                .with_context(|| format!("Failed to open database file: {}", connection_string))?
        };
        info!(database = connection_string, "sqlite database opened");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(seed = %path.display(), "seed file applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get_string(
    row: &SqliteRow,
    column: &str,
) -> Result<String, RepositoryError> {
    row.try_get(column).map_err(db_error)
}

fn get_flag(
    row: &SqliteRow,
    column: &str,
) -> Result<bool, RepositoryError> {
    let value: i64 = row.try_get(column).map_err(db_error)?;
    Ok(value != 0)
}

fn row_to_quote_request(row: &SqliteRow) -> Result<QuoteRequest, RepositoryError> {
    Ok(QuoteRequest {
        id: row.try_get("id").map_err(db_error)?,
        company_name: get_string(row, "company_name")?,
        contact_name: get_string(row, "contact_name")?,
        email: get_string(row, "email")?,
        phone: get_string(row, "phone")?,
        requirements: get_string(row, "requirements")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

#[async_trait]
impl FulfillmentRepository for SqliteRepository {
    async fn get_rate_card(
        &self,
        name: &str,
    ) -> Result<RateCard, RepositoryError> {
        sqlx::query("SELECT name FROM rate_cards WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        let rows = sqlx::query(
            "SELECT rate_key, amount FROM rate_card_rates WHERE card_name = ? ORDER BY rate_key",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        // Rates missing from the table keep their published value.
        let mut card = RateCard::named(name);
        for row in &rows {
            let key = get_string(row, "rate_key")?;
            let amount = get_decimal(row, "amount")?;
            card.set_rate(&key, amount)
                .map_err(|e| RepositoryError::Database(format!("rate card '{}': {}", name, e)))?;
        }
        Ok(card)
    }

    async fn list_rate_cards(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT name FROM rate_cards ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(|row| get_string(row, "name")).collect()
    }

    async fn save_rate_card(
        &self,
        card: &RateCard,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "INSERT INTO rate_cards (name, updated_at) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at",
        )
        .bind(&card.name)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query("DELETE FROM rate_card_rates WHERE card_name = ?")
            .bind(&card.name)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for (key, amount) in card.rates() {
            sqlx::query("INSERT INTO rate_card_rates (card_name, rate_key, amount) VALUES (?, ?, ?)")
                .bind(&card.name)
                .bind(key)
                .bind(decimal_to_text(amount))
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        info!(card = %card.name, "rate card saved");
        Ok(())
    }

    async fn delete_rate_card(
        &self,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM rate_card_rates WHERE card_name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        let result = sqlx::query("DELETE FROM rate_cards WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await.map_err(db_error)
    }

    async fn load_standard_fulfillment(
        &self
    ) -> Result<Option<StandardFulfillmentState>, RepositoryError> {
        let row = sqlx::query(
            "SELECT monthly_inventory_volume, monthly_order_volume, average_order_weight,
                    is_submitted
             FROM standard_fulfillment_state WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|row| -> Result<StandardFulfillmentState, RepositoryError> {
            Ok(StandardFulfillmentState {
                input: StandardFulfillmentInput {
                    monthly_inventory_volume: get_decimal(&row, "monthly_inventory_volume")?,
                    monthly_order_volume: get_count(&row, "monthly_order_volume")?,
                    average_order_weight: get_decimal(&row, "average_order_weight")?,
                },
                is_submitted: get_flag(&row, "is_submitted")?,
            })
        })
        .transpose()
    }

    async fn save_standard_fulfillment(
        &self,
        state: &StandardFulfillmentState,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO standard_fulfillment_state (
                id, monthly_inventory_volume, monthly_order_volume, average_order_weight,
                is_submitted, updated_at
             ) VALUES (1, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                monthly_inventory_volume = excluded.monthly_inventory_volume,
                monthly_order_volume = excluded.monthly_order_volume,
                average_order_weight = excluded.average_order_weight,
                is_submitted = excluded.is_submitted,
                updated_at = excluded.updated_at",
        )
        .bind(decimal_to_text(state.input.monthly_inventory_volume))
        .bind(i64::from(state.input.monthly_order_volume))
        .bind(decimal_to_text(state.input.average_order_weight))
        .bind(state.is_submitted)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        debug!(submitted = state.is_submitted, "standard fulfillment state saved");
        Ok(())
    }

    async fn load_custom_requirements(
        &self
    ) -> Result<Option<CustomRequirementsState>, RepositoryError> {
        let row = sqlx::query(
            "SELECT company_name, contact_name, email, phone, requirements, is_submitted
             FROM custom_requirements_draft WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|row| -> Result<CustomRequirementsState, RepositoryError> {
            Ok(CustomRequirementsState {
                form: CustomRequirementsForm {
                    company_name: get_string(&row, "company_name")?,
                    contact_name: get_string(&row, "contact_name")?,
                    email: get_string(&row, "email")?,
                    phone: get_string(&row, "phone")?,
                    requirements: get_string(&row, "requirements")?,
                },
                is_submitted: get_flag(&row, "is_submitted")?,
            })
        })
        .transpose()
    }

    async fn save_custom_requirements(
        &self,
        state: &CustomRequirementsState,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO custom_requirements_draft (
                id, company_name, contact_name, email, phone, requirements,
                is_submitted, updated_at
             ) VALUES (1, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                company_name = excluded.company_name,
                contact_name = excluded.contact_name,
                email = excluded.email,
                phone = excluded.phone,
                requirements = excluded.requirements,
                is_submitted = excluded.is_submitted,
                updated_at = excluded.updated_at",
        )
        .bind(&state.form.company_name)
        .bind(&state.form.contact_name)
        .bind(&state.form.email)
        .bind(&state.form.phone)
        .bind(&state.form.requirements)
        .bind(state.is_submitted)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn create_quote_request(
        &self,
        request: NewQuoteRequest,
    ) -> Result<QuoteRequest, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO quote_requests (
                company_name, contact_name, email, phone, requirements, created_at
             ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.company_name)
        .bind(&request.contact_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.requirements)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        info!(id, company = %request.company_name, "quote request stored");
        self.get_quote_request(id).await
    }

    async fn get_quote_request(
        &self,
        id: i64,
    ) -> Result<QuoteRequest, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, company_name, contact_name, email, phone, requirements, created_at
             FROM quote_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_quote_request(&row)
    }

    async fn list_quote_requests(&self) -> Result<Vec<QuoteRequest>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, company_name, contact_name, email, phone, requirements, created_at
             FROM quote_requests ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_quote_request).collect()
    }

    async fn delete_quote_request(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM quote_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::open(IN_MEMORY)
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn new_quote_request(company: &str) -> NewQuoteRequest {
        NewQuoteRequest {
            company_name: company.to_string(),
            contact_name: "Jordan Lee".to_string(),
            email: "jordan@example.com".to_string(),
            phone: "555-0199".to_string(),
            requirements: "Cold chain storage for 40 pallets".to_string(),
        }
    }

    // =========================================================================
    // Rate cards
    // =========================================================================

    #[tokio::test]
    async fn missing_rate_card_is_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(
            repo.get_rate_card("standard").await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn saved_rate_card_round_trips() {
        let repo = setup_test_db().await;
        let mut card = RateCard::named("peak-season");
        card.receiving.weekend_surcharge = dec!(1.50);
        card.storage.long_term_min_months = 3;

        repo.save_rate_card(&card).await.unwrap();

        assert_eq!(repo.get_rate_card("peak-season").await.unwrap(), card);
    }

    #[tokio::test]
    async fn saving_again_replaces_rates() {
        let repo = setup_test_db().await;
        let mut card = RateCard::named("promo");
        repo.save_rate_card(&card).await.unwrap();

        card.pick_pack.pick_fee_per_item = dec!(0.60);
        repo.save_rate_card(&card).await.unwrap();

        let loaded = repo.get_rate_card("promo").await.unwrap();
        assert_eq!(loaded.pick_pack.pick_fee_per_item, dec!(0.60));
        assert_eq!(repo.list_rate_cards().await.unwrap(), vec!["promo"]);
    }

    #[tokio::test]
    async fn unstored_rates_keep_published_values() {
        let repo = setup_test_db().await;
        sqlx::query("INSERT INTO rate_cards (name, updated_at) VALUES ('sparse', '2025-01-01T00:00:00+00:00')")
            .execute(repo.pool())
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO rate_card_rates (card_name, rate_key, amount)
             VALUES ('sparse', 'receiving.pallet_fee', '30')",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let card = repo.get_rate_card("sparse").await.unwrap();

        assert_eq!(card.receiving.pallet_fee, dec!(30));
        assert_eq!(card.receiving.carton_fee, dec!(3.00));
    }

    #[tokio::test]
    async fn unknown_stored_rate_is_a_database_error() {
        let repo = setup_test_db().await;
        repo.save_rate_card(&RateCard::named("odd")).await.unwrap();
        sqlx::query(
            "INSERT INTO rate_card_rates (card_name, rate_key, amount)
             VALUES ('odd', 'storage.moon_rate', '1')",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        assert!(matches!(
            repo.get_rate_card("odd").await,
            Err(RepositoryError::Database(msg)) if msg.contains("storage.moon_rate")
        ));
    }

    #[tokio::test]
    async fn delete_rate_card_removes_it() {
        let repo = setup_test_db().await;
        repo.save_rate_card(&RateCard::named("old")).await.unwrap();

        repo.delete_rate_card("old").await.unwrap();

        assert_eq!(repo.get_rate_card("old").await, Err(RepositoryError::NotFound));
        assert_eq!(
            repo.delete_rate_card("old").await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn seeds_install_published_card() {
        let repo = setup_test_db().await;
        let seeds = Path::new(env!("CARGO_MANIFEST_DIR")).join("seeds");

        repo.run_seeds(&seeds).await.unwrap();
        // Seeds are safe to re-run.
        repo.run_seeds(&seeds).await.unwrap();

        assert_eq!(repo.get_rate_card("standard").await.unwrap(), RateCard::default());
    }

    // =========================================================================
    // Calculator state
    // =========================================================================

    #[tokio::test]
    async fn standard_fulfillment_state_starts_empty() {
        let repo = setup_test_db().await;

        assert_eq!(repo.load_standard_fulfillment().await.unwrap(), None);
    }

    #[tokio::test]
    async fn standard_fulfillment_state_is_overwritten() {
        let repo = setup_test_db().await;
        repo.save_standard_fulfillment(&StandardFulfillmentState::default())
            .await
            .unwrap();

        let state = StandardFulfillmentState {
            input: StandardFulfillmentInput {
                monthly_inventory_volume: dec!(240.5),
                monthly_order_volume: 1200,
                average_order_weight: dec!(3.25),
            },
            is_submitted: true,
        };
        repo.save_standard_fulfillment(&state).await.unwrap();

        assert_eq!(repo.load_standard_fulfillment().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn custom_requirements_draft_round_trips() {
        let repo = setup_test_db().await;
        let state = CustomRequirementsState {
            form: CustomRequirementsForm {
                company_name: "Northwind".to_string(),
                email: "ops@northwind".to_string(),
                ..CustomRequirementsForm::default()
            },
            is_submitted: false,
        };

        repo.save_custom_requirements(&state).await.unwrap();

        assert_eq!(repo.load_custom_requirements().await.unwrap(), Some(state));
    }

    // =========================================================================
    // Quote requests
    // =========================================================================

    #[tokio::test]
    async fn create_and_get_quote_request() {
        let repo = setup_test_db().await;

        let created = repo
            .create_quote_request(new_quote_request("Northwind"))
            .await
            .unwrap();
        let fetched = repo.get_quote_request(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.company_name, "Northwind");
    }

    #[tokio::test]
    async fn list_quote_requests_newest_first() {
        let repo = setup_test_db().await;
        let first = repo
            .create_quote_request(new_quote_request("First"))
            .await
            .unwrap();
        let second = repo
            .create_quote_request(new_quote_request("Second"))
            .await
            .unwrap();

        let ids: Vec<i64> = repo
            .list_quote_requests()
            .await
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect();

        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn delete_missing_quote_request_is_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(
            repo.delete_quote_request(42).await,
            Err(RepositoryError::NotFound)
        );
    }
}
