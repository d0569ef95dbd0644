//! Nearest-neighbour lookup over `products.image_embedding` (pgvector, cosine
//! distance). The column is outside the entity so these statements are raw.

use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement, Value};

use crate::{entity::products, error::AppResult};

/// Matches must be strictly closer than this cosine distance.
pub const SIMILARITY_THRESHOLD: f64 = 0.2;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.barcode, p.image_url, p.generic_name, \
     p.ingredients, p.categories, p.brands, p.ai_health_summary, p.ai_health_conclusion, \
     p.last_updated";

/// pgvector text form: `[0.1,0.2,...]`.
pub fn vector_literal(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

pub async fn set_embedding<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    embedding: &[f32],
) -> AppResult<()> {
    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "UPDATE products SET image_embedding = CAST($1 AS vector) WHERE id = $2",
        [Value::from(vector_literal(embedding)), Value::from(product_id)],
    ))
    .await?;
    Ok(())
}

/// Closest product under [`SIMILARITY_THRESHOLD`], with its distance.
///
/// With `scanned_by` set, only products present in that user's history are
/// candidates.
pub async fn nearest_product<C: ConnectionTrait>(
    db: &C,
    embedding: &[f32],
    scanned_by: Option<i32>,
) -> AppResult<Option<(products::Model, f64)>> {
    let mut values = vec![
        Value::from(vector_literal(embedding)),
        Value::from(SIMILARITY_THRESHOLD),
    ];
    let scope = match scanned_by {
        Some(user_id) => {
            values.push(Value::from(user_id));
            " AND EXISTS (SELECT 1 FROM history h WHERE h.product_id = p.id AND h.user_id = $3)"
        }
        None => "",
    };

    let sql = format!(
        "SELECT {PRODUCT_COLUMNS}, (p.image_embedding <=> CAST($1 AS vector)) AS distance \
         FROM products p \
         WHERE p.image_embedding IS NOT NULL \
         AND (p.image_embedding <=> CAST($1 AS vector)) < $2{scope} \
         ORDER BY distance ASC \
         LIMIT 1"
    );

    let row = db
        .query_one(Statement::from_sql_and_values(DbBackend::Postgres, sql, values))
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let product = products::Model::from_query_result(&row, "")?;
    let distance: f64 = row.try_get("", "distance")?;
    tracing::debug!(product_id = product.id, distance, "image matched product");
    Ok(Some((product, distance)))
}
