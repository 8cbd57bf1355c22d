use sqlx::sqlite::SqlitePool;

/// Drop and recreate the `cot` table in one transaction
pub async fn replace_cot_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DROP TABLE IF EXISTS cot")
        .execute(&mut *tx)
        .await?;
    sqlx::query(include_str!("cot.sql"))
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}
