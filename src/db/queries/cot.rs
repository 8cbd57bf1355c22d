use futures::TryStreamExt;
use sqlx::sqlite::SqlitePool;

use crate::db::models::cot::{CotRowModel, NewCotRowModel};

/// Insert all rows inside a single transaction
pub async fn insert_cot_rows(
    pool: &SqlitePool,
    rows: &[NewCotRowModel],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for row in rows {
        inserted += sqlx::query(
            r#"
            INSERT INTO cot (managed_money, date, price, long_positions, short_positions)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(row.managed_money)
        .bind(row.date)
        .bind(row.price)
        .bind(row.long_positions)
        .bind(row.short_positions)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Fetch every row of the table ordered by date
pub async fn get_all_cot_rows(pool: &SqlitePool) -> Result<Vec<CotRowModel>, sqlx::Error> {
    sqlx::query_as::<_, CotRowModel>(
        r#"
        SELECT managed_money, date, price, long_positions, short_positions
        FROM cot
        ORDER BY date ASC
        "#,
    )
    .fetch(pool)
    .try_collect()
    .await
}

pub async fn count_cot_rows(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cot")
        .fetch_one(pool)
        .await
}
