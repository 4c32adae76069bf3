//! Listing persistence behind a trait, so handlers run against Postgres in
//! production and an in-memory map in tests or `STORAGE=memory` setups.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::listing::{ListingColumns, ListingRow};

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// All listings, newest first.
    async fn list(&self) -> Result<Vec<ListingRow>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<ListingRow>, AppError>;

    /// Inserts a new listing. Fails with `Validation` without a product name.
    async fn create(&self, columns: ListingColumns) -> Result<ListingRow, AppError>;

    /// Applies a partial update. `None` when the listing does not exist.
    async fn update(
        &self,
        id: Uuid,
        columns: ListingColumns,
    ) -> Result<Option<ListingRow>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgListingStore {
    db: PgPool,
}

impl PgListingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn list(&self) -> Result<Vec<ListingRow>, AppError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            "SELECT * FROM resell_posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ListingRow>, AppError> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT * FROM resell_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn create(&self, columns: ListingColumns) -> Result<ListingRow, AppError> {
        let new = ListingRow::new(columns)?;

        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            INSERT INTO resell_posts
                (id, product_name, brand, purchase_date, usage_count, condition,
                 condition_note, base_items, extra_items, features, purchase_price,
                 asking_price, trade_types, trade_area, nego, ai_draft, pending_draft,
                 final_draft, fields)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(&new.product_name)
        .bind(&new.brand)
        .bind(&new.purchase_date)
        .bind(new.usage_count)
        .bind(&new.condition)
        .bind(&new.condition_note)
        .bind(&new.base_items)
        .bind(&new.extra_items)
        .bind(&new.features)
        .bind(new.purchase_price)
        .bind(new.asking_price)
        .bind(&new.trade_types)
        .bind(&new.trade_area)
        .bind(&new.negotiation_note)
        .bind(&new.ai_draft)
        .bind(&new.pending_draft)
        .bind(&new.final_draft)
        .bind(&new.fields)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        columns: ListingColumns,
    ) -> Result<Option<ListingRow>, AppError> {
        // COALESCE keeps every column the caller did not send.
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            UPDATE resell_posts SET
                product_name   = COALESCE($2, product_name),
                brand          = COALESCE($3, brand),
                purchase_date  = COALESCE($4, purchase_date),
                usage_count    = COALESCE($5, usage_count),
                condition      = COALESCE($6, condition),
                condition_note = COALESCE($7, condition_note),
                base_items     = COALESCE($8, base_items),
                extra_items    = COALESCE($9, extra_items),
                features       = COALESCE($10, features),
                purchase_price = COALESCE($11, purchase_price),
                asking_price   = COALESCE($12, asking_price),
                trade_types    = COALESCE($13, trade_types),
                trade_area     = COALESCE($14, trade_area),
                nego           = COALESCE($15, nego),
                ai_draft       = COALESCE($16, ai_draft),
                pending_draft  = COALESCE($17, pending_draft),
                final_draft    = COALESCE($18, final_draft),
                fields         = COALESCE($19, fields)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&columns.product_name)
        .bind(&columns.brand)
        .bind(&columns.purchase_date)
        .bind(columns.usage_count)
        .bind(&columns.condition)
        .bind(&columns.condition_note)
        .bind(&columns.base_items)
        .bind(&columns.extra_items)
        .bind(&columns.features)
        .bind(columns.purchase_price)
        .bind(columns.asking_price)
        .bind(&columns.trade_types)
        .bind(&columns.trade_area)
        .bind(&columns.negotiation_note)
        .bind(&columns.ai_draft)
        .bind(&columns.pending_draft)
        .bind(&columns.final_draft)
        .bind(&columns.fields)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemListingStore {
    rows: RwLock<HashMap<Uuid, ListingRow>>,
}

impl MemListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemListingStore {
    async fn list(&self) -> Result<Vec<ListingRow>, AppError> {
        let mut rows: Vec<ListingRow> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ListingRow>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, columns: ListingColumns) -> Result<ListingRow, AppError> {
        let row = ListingRow::new(columns)?;
        self.rows.write().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        columns: ListingColumns,
    ) -> Result<Option<ListingRow>, AppError> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|row| {
            row.apply(columns);
            row.clone()
        }))
    }
}
