//! Database initialization module
//!
//! Provides one-time database setup functionality for the paletted_init tool.

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use tracing::info;

use crate::auth::accounts::AccountService;
use crate::auth::MIN_PASSWORD_LEN;
use crate::db::Database;
use crate::palettes::{NewPalette, PaletteStore};

/// Admin account to create alongside the schema
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

/// The sample palette every fresh database starts with
pub fn sample_palette() -> NewPalette {
    NewPalette {
        name: "Ocean Breeze".to_string(),
        hex_list: ["#0E2148", "#483AA0", "#7965C1", "#E3D095"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        description: Some("Cool and calm".to_string()),
    }
}

/// Initialize a new palette database
///
/// # Arguments
/// * `path` - Path to the SQLite database file (must not exist)
/// * `admin` - Optional admin account (password must be >= 8 chars)
///
/// Returns the id of the seeded sample palette.
///
/// # Errors
/// * Database file already exists
/// * Password too short
/// * Database creation fails
pub async fn init_database(path: &Path, admin: Option<&AdminAccount>) -> Result<i64> {
    // Fail if database already exists
    if path.exists() {
        bail!(
            "Database file already exists: {}. Remove it first or use a different path.",
            path.display()
        );
    }

    if let Some(admin) = admin {
        if admin.password.len() < MIN_PASSWORD_LEN {
            bail!(
                "Admin password must be at least {} characters",
                MIN_PASSWORD_LEN
            );
        }
    }

    info!("Creating new database at {}", path.display());

    // Create the database (runs migrations)
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Database path is not valid UTF-8: {}", path.display()))?;
    let db = Database::new(Some(path_str)).await?;

    if let Some(admin) = admin {
        let service = AccountService::new(db.pool().clone());
        let user = service.register(&admin.email, &admin.password).await?;
        info!("Created admin account '{}' ({})", user.email, user.id);
    }

    let store = PaletteStore::new(db.pool().clone());
    let palette = store.create(sample_palette(), None).await?;
    info!("Inserted palette_id = {}", palette.id);

    info!("Database initialization complete");
    Ok(palette.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn admin(password: &str) -> AdminAccount {
        AdminAccount {
            email: "admin@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_init_database_creates_new() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let palette_id = init_database(&db_path, None).await.unwrap();

        // Verify file was created
        assert!(db_path.exists());

        // Verify the sample palette is there
        let db = Database::new(db_path.to_str()).await.unwrap();
        let store = PaletteStore::new(db.pool().clone());
        let palette = store.get(palette_id).await.unwrap().unwrap();
        assert_eq!(palette.name, "Ocean Breeze");
        assert_eq!(palette.description.as_deref(), Some("Cool and calm"));
        assert_eq!(palette.hex_list.len(), 4);
    }

    #[tokio::test]
    async fn test_init_database_with_admin() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        init_database(&db_path, Some(&admin("password123")))
            .await
            .unwrap();

        let db = Database::new(db_path.to_str()).await.unwrap();
        let service = AccountService::new(db.pool().clone());
        let (user, _) = service
            .login("admin@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "admin@example.com");
    }

    #[tokio::test]
    async fn test_init_database_fails_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create first
        init_database(&db_path, None).await.unwrap();

        // Try again - should fail
        let result = init_database(&db_path, None).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_init_database_password_validation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let result = init_database(&db_path, Some(&admin("short"))).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("8 characters"));
        assert!(!db_path.exists());
    }
}
