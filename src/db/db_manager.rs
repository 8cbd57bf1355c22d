use sqlx::sqlite::SqlitePool;
use tracing::{info, instrument, warn};

use super::connection;
use super::models::cot::NewCotRowModel;
use super::queries::cot as cot_queries;
use super::schema;
use crate::seasonality::PositionRecord;

pub struct DbManager {
    pub pool: SqlitePool,
}

impl DbManager {
    /// Opens the store; the `cot` table is left untouched
    pub async fn init(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = connection::create_pool(database_url).await?;
        Ok(Self { pool })
    }

    /// Create or replace the `cot` table, discarding any previous rows
    pub async fn replace_cot_table(&self) -> Result<(), sqlx::Error> {
        schema::replace_cot_table(&self.pool).await
    }

    /// Replace the table contents with `records`
    #[instrument(name = "store_records", skip_all, fields(records = records.len(), on_close = true))]
    pub async fn replace_records(&self, records: &[PositionRecord]) -> Result<u64, sqlx::Error> {
        self.replace_cot_table().await?;

        let rows = records.iter().map(NewCotRowModel::from).collect::<Vec<_>>();
        let inserted = cot_queries::insert_cot_rows(&self.pool, &rows).await?;
        info!(inserted, "Records written to cot table");
        Ok(inserted)
    }

    /// Load every complete row, ordered by date
    pub async fn load_records(&self) -> Result<Vec<PositionRecord>, sqlx::Error> {
        let rows = cot_queries::get_all_cot_rows(&self.pool).await?;
        let total = rows.len();

        let records = rows
            .into_iter()
            .filter_map(|row| row.into_record())
            .collect::<Vec<_>>();
        if records.len() < total {
            warn!(skipped = total - records.len(), "Skipped cot rows with NULL positioning columns");
        }
        Ok(records)
    }

    pub async fn count_records(&self) -> Result<i64, sqlx::Error> {
        cot_queries::count_cot_rows(&self.pool).await
    }
}
