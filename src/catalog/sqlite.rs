//! SQLite Catalog
//! Mission: Serve product metadata and compatibility edges from disk
//!
//! Read side of the catalog the ingestion pipeline writes. Tag sets are
//! JSON-encoded columns; edges carry a covering index for the neighbor
//! query (from_sku, score desc, to_sku asc).

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::{HashMap, HashSet};

use crate::catalog::{EdgeStore, ProductStore};
use crate::models::{Edge, Product, Slot};

/// SQLite variable limit is 999 on older builds; stay well under it.
const IN_CHUNK: usize = 500;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS products (
    sku TEXT PRIMARY KEY,
    slot TEXT NOT NULL,
    occasion_json TEXT NOT NULL DEFAULT '[]',
    aesthetics_json TEXT NOT NULL DEFAULT '[]',
    season_json TEXT NOT NULL DEFAULT '[]',
    formality_score INTEGER,
    formality_level TEXT NOT NULL DEFAULT '',
    primary_color TEXT NOT NULL DEFAULT '',
    statement_piece INTEGER NOT NULL DEFAULT 0,
    title TEXT NOT NULL DEFAULT '',
    brand TEXT NOT NULL DEFAULT '',
    image_url TEXT NOT NULL DEFAULT '',
    item_type TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT ''
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS edges (
    from_sku TEXT NOT NULL,
    to_sku TEXT NOT NULL,
    target_slot TEXT NOT NULL,
    score REAL NOT NULL,
    PRIMARY KEY (from_sku, to_sku)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_edges_neighbor
    ON edges(from_sku, score DESC, to_sku ASC);
"#;

const PRODUCT_COLUMNS: &str = "sku, slot, occasion_json, aesthetics_json, season_json, \
     formality_score, formality_level, primary_color, statement_piece, \
     title, brand, image_url, item_type, category";

/// SQLite-backed catalog adapter.
pub struct SqliteCatalog {
    db_path: String,
}

impl SqliteCatalog {
    /// Open (creating if needed) the catalog database and initialize the
    /// schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let catalog = Self {
            db_path: db_path.to_string(),
        };
        let conn = catalog.open()?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize catalog schema")?;
        Ok(catalog)
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open catalog db at {}", self.db_path))
    }

    /// Insert or replace a product. Write path used by fixtures and the
    /// offline importer; the service itself only reads.
    pub fn upsert_product(&self, product: &Product) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT OR REPLACE INTO products (sku, slot, occasion_json, aesthetics_json, \
             season_json, formality_score, formality_level, primary_color, statement_piece, \
             title, brand, image_url, item_type, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                product.sku,
                product.slot.wire_name(),
                serde_json::to_string(&product.occasion)?,
                serde_json::to_string(&product.aesthetics)?,
                serde_json::to_string(&product.season)?,
                product.formality_score,
                product.formality_level,
                product.primary_color,
                product.statement_piece as i64,
                product.title,
                product.brand,
                product.image_url,
                product.item_type,
                product.category,
            ],
        )
        .context("Failed to upsert product")?;
        Ok(())
    }

    pub fn upsert_edge(&self, edge: &Edge) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT OR REPLACE INTO edges (from_sku, to_sku, target_slot, score)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                edge.from_sku,
                edge.to_sku,
                edge.target_slot.wire_name(),
                edge.score
            ],
        )
        .context("Failed to upsert edge")?;
        Ok(())
    }

    pub fn product_count(&self) -> Result<i64> {
        let conn = self.open()?;
        conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .context("Failed to count products")
    }

    fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
        let slot_str: String = row.get(1)?;
        let occasion_json: String = row.get(2)?;
        let aesthetics_json: String = row.get(3)?;
        let season_json: String = row.get(4)?;

        Ok(Product {
            sku: row.get(0)?,
            slot: Slot::parse(&slot_str).unwrap_or(Slot::Accessory),
            occasion: serde_json::from_str(&occasion_json).unwrap_or_default(),
            aesthetics: serde_json::from_str(&aesthetics_json).unwrap_or_default(),
            season: serde_json::from_str(&season_json).unwrap_or_default(),
            formality_score: row.get(5)?,
            formality_level: row.get(6)?,
            primary_color: row.get(7)?,
            statement_piece: row.get::<_, i64>(8)? != 0,
            title: row.get(9)?,
            brand: row.get(10)?,
            image_url: row.get(11)?,
            item_type: row.get(12)?,
            category: row.get(13)?,
        })
    }

    fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<Edge> {
        let slot_str: String = row.get(2)?;
        Ok(Edge {
            from_sku: row.get(0)?,
            to_sku: row.get(1)?,
            target_slot: Slot::parse(&slot_str).unwrap_or(Slot::Accessory),
            score: row.get(3)?,
        })
    }
}

#[async_trait]
impl ProductStore for SqliteCatalog {
    async fn get(&self, sku: &str) -> Result<Option<Product>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM products WHERE sku = ?1",
            PRODUCT_COLUMNS
        ))?;

        match stmt.query_row(params![sku], Self::row_to_product) {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_many(&self, skus: &[String]) -> Result<HashMap<String, Product>> {
        let conn = self.open()?;
        let mut out = HashMap::with_capacity(skus.len());

        for chunk in skus.chunks(IN_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "SELECT {} FROM products WHERE sku IN ({})",
                PRODUCT_COLUMNS, placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                let product = Self::row_to_product(row)?;
                out.insert(product.sku.clone(), product);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl EdgeStore for SqliteCatalog {
    async fn neighbors(
        &self,
        sku: &str,
        min_score: f64,
        limit: Option<usize>,
    ) -> Result<Vec<Edge>> {
        let conn = self.open()?;
        let mut sql = String::from(
            "SELECT from_sku, to_sku, target_slot, score FROM edges
             WHERE from_sku = ?1 AND score >= ?2
             ORDER BY score DESC, to_sku ASC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let edges = stmt
            .query_map(params![sku, min_score], Self::row_to_edge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    async fn edges_among(&self, skus: &[String]) -> Result<Vec<Edge>> {
        let members: HashSet<&str> = skus.iter().map(|s| s.as_str()).collect();
        let conn = self.open()?;
        let mut out = Vec::new();

        // Chunk the from-side IN list and post-filter the to-side in memory;
        // a double IN over two chunked lists would miss cross-chunk pairs.
        for chunk in skus.chunks(IN_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "SELECT from_sku, to_sku, target_slot, score FROM edges WHERE from_sku IN ({})",
                placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                let edge = Self::row_to_edge(row)?;
                if members.contains(edge.to_sku.as_str()) {
                    out.push(edge);
                }
            }
        }
        Ok(out)
    }
}
