//! Palette storage and favorites
//!
//! Provides:
//! - Palette creation, listing and lookup
//! - Per-user favorite toggling with like counts
//! - Persistence in SQLite (`hex_list` stored as a JSON array)

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use crate::color::{validate_colors, ColorError};

/// A stored palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub id: i64,
    pub name: String,
    pub hex_list: Vec<String>,
    pub description: Option<String>,
    pub creator_id: Option<i64>,
}

/// Palette as listed to clients, with its favorite count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteSummary {
    pub id: i64,
    pub name: String,
    pub hex_list: Vec<String>,
    pub description: Option<String>,
    pub like_count: i64,
}

/// Input for creating a palette
#[derive(Debug, Clone)]
pub struct NewPalette {
    pub name: String,
    pub hex_list: Vec<String>,
    pub description: Option<String>,
}

/// Outcome of a favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Favorited,
    Unfavorited,
}

impl FavoriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteAction::Favorited => "favorited",
            FavoriteAction::Unfavorited => "unfavorited",
        }
    }
}

/// Palette errors
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("Palette with id {0} not found.")]
    NotFound(i64),

    #[error(transparent)]
    InvalidColors(#[from] ColorError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored hex_list is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

type SummaryRow = (i64, String, String, Option<String>, i64);

fn summary_from_row(row: SummaryRow) -> Result<PaletteSummary, PaletteError> {
    let (id, name, hex_list, description, like_count) = row;
    Ok(PaletteSummary {
        id,
        name,
        hex_list: serde_json::from_str(&hex_list)?,
        description,
        like_count,
    })
}

const SUMMARY_COLUMNS: &str = "p.id, p.name, p.hex_list, p.description, \
     (SELECT COUNT(*) FROM favorites f WHERE f.palette_id = p.id)";

/// Palette store backed by SQLite
#[derive(Debug, Clone)]
pub struct PaletteStore {
    pool: SqlitePool,
}

impl PaletteStore {
    /// Create a new palette store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a palette after validating its colors
    pub async fn create(
        &self,
        palette: NewPalette,
        creator_id: Option<i64>,
    ) -> Result<Palette, PaletteError> {
        validate_colors(&palette.hex_list)?;
        let hex_json = serde_json::to_string(&palette.hex_list)?;

        let result = sqlx::query(
            "INSERT INTO palettes (name, hex_list, description, creator_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&palette.name)
        .bind(&hex_json)
        .bind(&palette.description)
        .bind(creator_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Created palette {} '{}'", id, palette.name);

        Ok(Palette {
            id,
            name: palette.name,
            hex_list: palette.hex_list,
            description: palette.description,
            creator_id,
        })
    }

    /// Get a palette by id
    pub async fn get(&self, id: i64) -> Result<Option<Palette>, PaletteError> {
        let row: Option<(i64, String, String, Option<String>, Option<i64>)> = sqlx::query_as(
            "SELECT id, name, hex_list, description, creator_id FROM palettes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, name, hex_list, description, creator_id)| {
            Ok(Palette {
                id,
                name,
                hex_list: serde_json::from_str(&hex_list)?,
                description,
                creator_id,
            })
        })
        .transpose()
    }

    /// All palettes with like counts, oldest first
    pub async fn list(&self) -> Result<Vec<PaletteSummary>, PaletteError> {
        let rows: Vec<SummaryRow> =
            sqlx::query_as(&format!("SELECT {} FROM palettes p ORDER BY p.id", SUMMARY_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(summary_from_row).collect()
    }

    /// One palette with its like count
    pub async fn summary(&self, id: i64) -> Result<PaletteSummary, PaletteError> {
        let row: Option<SummaryRow> =
            sqlx::query_as(&format!("SELECT {} FROM palettes p WHERE p.id = ?", SUMMARY_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(summary_from_row)
            .transpose()?
            .ok_or(PaletteError::NotFound(id))
    }

    /// Number of users who favorited a palette
    pub async fn like_count(&self, palette_id: i64) -> Result<i64, PaletteError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE palette_id = ?")
            .bind(palette_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Favorite the palette, or unfavorite it if already favorited
    pub async fn toggle_favorite(
        &self,
        user_id: i64,
        palette_id: i64,
    ) -> Result<(FavoriteAction, i64), PaletteError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM palettes WHERE id = ?")
            .bind(palette_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(PaletteError::NotFound(palette_id));
        }

        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND palette_id = ?")
            .bind(user_id)
            .bind(palette_id)
            .execute(&self.pool)
            .await?;

        let action = if removed.rows_affected() > 0 {
            FavoriteAction::Unfavorited
        } else {
            sqlx::query("INSERT INTO favorites (user_id, palette_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(palette_id)
                .execute(&self.pool)
                .await?;
            FavoriteAction::Favorited
        };

        let count = self.like_count(palette_id).await?;
        debug!(
            "User {} {} palette {} ({} likes)",
            user_id,
            action.as_str(),
            palette_id,
            count
        );
        Ok((action, count))
    }

    /// Palettes a user has favorited
    pub async fn favorites(&self, user_id: i64) -> Result<Vec<PaletteSummary>, PaletteError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM palettes p JOIN favorites fav ON fav.palette_id = p.id \
             WHERE fav.user_id = ? ORDER BY p.id",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(summary_from_row).collect()
    }
}
