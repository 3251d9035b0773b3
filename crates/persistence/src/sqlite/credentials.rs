//! Encrypted token rows

use crate::encryption::SealedToken;
use boxtrack_core::{Error, Result};
use sqlx::SqlitePool;

/// Row key of the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Row key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

const UPSERT_TOKEN: &str = r#"
    INSERT INTO credentials (key, token_encrypted, nonce, updated_at)
    VALUES (?, ?, ?, CURRENT_TIMESTAMP)
    ON CONFLICT(key) DO UPDATE SET
        token_encrypted = excluded.token_encrypted,
        nonce = excluded.nonce,
        updated_at = CURRENT_TIMESTAMP
"#;

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    token_encrypted: Vec<u8>,
    nonce: Vec<u8>,
}

/// Insert or replace one sealed token
pub async fn put_token(pool: &SqlitePool, key: &str, sealed: &SealedToken) -> Result<()> {
    sqlx::query(UPSERT_TOKEN)
        .bind(key)
        .bind(&sealed.ciphertext)
        .bind(&sealed.nonce[..])
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Write both tokens atomically
pub async fn put_pair(pool: &SqlitePool, access: &SealedToken, refresh: &SealedToken) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    for (key, sealed) in [(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)] {
        sqlx::query(UPSERT_TOKEN)
            .bind(key)
            .bind(&sealed.ciphertext)
            .bind(&sealed.nonce[..])
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Read one sealed token, if stored
pub async fn get_token(pool: &SqlitePool, key: &str) -> Result<Option<SealedToken>> {
    let row: Option<TokenRow> = sqlx::query_as(
        r#"
        SELECT token_encrypted, nonce
        FROM credentials
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(|r| SealedToken::from_parts(r.token_encrypted, &r.nonce))
        .transpose()
}

/// Remove every stored token
pub async fn delete_all_tokens(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM credentials")
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Number of stored token rows
pub async fn count_tokens(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM credentials")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(count)
}
