/// SQLite persistence layer for playbooks
///
/// Local stand-in for the playbook server. Workflows are stored as JSON documents keyed by
/// (playbook, name); the action catalog lives in the same database so a studio can run
/// fully offline.

use crate::api::{CatalogSource, PlaybookStore};
use crate::catalog::{AppApi, Device};
use crate::error::{Result, StudioError};
use crate::workflow::{Playbook, Workflow};
use futures::future::BoxFuture;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Row,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// SQLite-backed playbook store and catalog source
#[derive(Debug, Clone)]
pub struct SqlitePlaybookStore {
    pool: SqlitePool,
}

impl SqlitePlaybookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and make sure the schema exists
    ///
    /// The database file is created on first use.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Create the tables; safe to call multiple times
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS playbooks (
                name TEXT PRIMARY KEY,
                uid TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                playbook TEXT NOT NULL,
                name TEXT NOT NULL,
                definition JSON NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (playbook, name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS app_apis (
                name TEXT PRIMARY KEY,
                definition JSON NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY,
                definition JSON NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add or replace an app in the catalog
    pub async fn put_app_api(&self, app: &AppApi) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO app_apis (name, definition) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET definition = excluded.definition
            "#,
        )
        .bind(&app.name)
        .bind(serde_json::to_string(app)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Add or replace a configured device
    pub async fn put_device(&self, device: &Device) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO devices (id, definition) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET definition = excluded.definition
            "#,
        )
        .bind(device.id)
        .bind(serde_json::to_string(device)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ensure_playbook(&self, playbook: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO playbooks (name, uid) VALUES (?, ?)")
            .bind(playbook)
            .bind(Uuid::new_v4().to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fetch_workflow(&self, playbook: &str, workflow: &str) -> Result<Workflow> {
        let row = sqlx::query("SELECT definition FROM workflows WHERE playbook = ? AND name = ?")
            .bind(playbook)
            .bind(workflow)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let definition: String = row.get("definition");
                Ok(serde_json::from_str(&definition)?)
            }
            None => Err(not_found(playbook, workflow)),
        }
    }

    async fn insert_workflow(&self, playbook: &str, workflow: &Workflow) -> Result<()> {
        let exists = sqlx::query("SELECT 1 FROM workflows WHERE playbook = ? AND name = ?")
            .bind(playbook)
            .bind(&workflow.name)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if exists {
            return Err(StudioError::Storage(format!(
                "Workflow already exists: {} - {}",
                playbook, workflow.name
            )));
        }

        sqlx::query("INSERT INTO workflows (playbook, name, definition) VALUES (?, ?, ?)")
            .bind(playbook)
            .bind(&workflow.name)
            .bind(serde_json::to_string(workflow)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn not_found(playbook: &str, workflow: &str) -> StudioError {
    StudioError::Storage(format!("Workflow not found: {} - {}", playbook, workflow))
}

fn playbook_not_found(playbook: &str) -> StudioError {
    StudioError::Storage(format!("Playbook not found: {}", playbook))
}

impl PlaybookStore for SqlitePlaybookStore {
    fn list_playbooks(&self) -> BoxFuture<'_, Result<Vec<Playbook>>> {
        Box::pin(async move {
            let mut playbooks: BTreeMap<String, Playbook> = BTreeMap::new();

            for row in sqlx::query("SELECT name, uid FROM playbooks ORDER BY name")
                .fetch_all(&self.pool)
                .await?
            {
                let name: String = row.get("name");
                playbooks.insert(
                    name.clone(),
                    Playbook {
                        uid: Some(row.get("uid")),
                        name,
                        workflows: Vec::new(),
                    },
                );
            }

            for row in sqlx::query("SELECT playbook, definition FROM workflows ORDER BY name")
                .fetch_all(&self.pool)
                .await?
            {
                let playbook: String = row.get("playbook");
                let definition: String = row.get("definition");
                if let Some(entry) = playbooks.get_mut(&playbook) {
                    entry.workflows.push(serde_json::from_str(&definition)?);
                }
            }

            Ok(playbooks.into_values().collect())
        })
    }

    fn load_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(self.fetch_workflow(playbook, workflow))
    }

    fn save_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow_name: &'a str,
        workflow: &'a Workflow,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.ensure_playbook(playbook).await?;

            sqlx::query(
                r#"
                INSERT INTO workflows (playbook, name, definition, updated_at)
                VALUES (?, ?, ?, CURRENT_TIMESTAMP)
                ON CONFLICT(playbook, name) DO UPDATE SET
                    definition = excluded.definition,
                    updated_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(playbook)
            .bind(workflow_name)
            .bind(serde_json::to_string(workflow)?)
            .execute(&self.pool)
            .await?;

            tracing::debug!("💾 Stored workflow {} - {}", playbook, workflow_name);
            Ok(())
        })
    }

    fn new_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            self.ensure_playbook(playbook).await?;

            let created = Workflow {
                uid: Some(Uuid::new_v4().to_string()),
                ..Workflow::new(workflow)
            };
            self.insert_workflow(playbook, &created).await?;
            Ok(created)
        })
    }

    fn rename_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;

            let renamed = sqlx::query("UPDATE playbooks SET name = ? WHERE name = ?")
                .bind(new_name)
                .bind(playbook)
                .execute(&mut *tx)
                .await?;
            if renamed.rows_affected() == 0 {
                return Err(playbook_not_found(playbook));
            }

            sqlx::query("UPDATE workflows SET playbook = ? WHERE playbook = ?")
                .bind(new_name)
                .bind(playbook)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(())
        })
    }

    fn duplicate_playbook<'a>(&'a self, playbook: &'a str, new_name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let rows = sqlx::query("SELECT definition FROM workflows WHERE playbook = ?")
                .bind(playbook)
                .fetch_all(&self.pool)
                .await?;

            let mut tx = self.pool.begin().await?;

            let known = sqlx::query("SELECT 1 FROM playbooks WHERE name = ?")
                .bind(playbook)
                .fetch_optional(&mut *tx)
                .await?;
            if known.is_none() {
                return Err(playbook_not_found(playbook));
            }

            sqlx::query("INSERT INTO playbooks (name, uid) VALUES (?, ?)")
                .bind(new_name)
                .bind(Uuid::new_v4().to_string())
                .execute(&mut *tx)
                .await?;

            for row in rows {
                let definition: String = row.get("definition");
                let mut copy: Workflow = serde_json::from_str(&definition)?;
                copy.uid = Some(Uuid::new_v4().to_string());

                sqlx::query("INSERT INTO workflows (playbook, name, definition) VALUES (?, ?, ?)")
                    .bind(new_name)
                    .bind(&copy.name)
                    .bind(serde_json::to_string(&copy)?)
                    .execute(&mut *tx)
                    .await?;
            }

            tx.commit().await?;
            Ok(())
        })
    }

    fn delete_playbook<'a>(&'a self, playbook: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;

            sqlx::query("DELETE FROM workflows WHERE playbook = ?")
                .bind(playbook)
                .execute(&mut *tx)
                .await?;
            let deleted = sqlx::query("DELETE FROM playbooks WHERE name = ?")
                .bind(playbook)
                .execute(&mut *tx)
                .await?;
            if deleted.rows_affected() == 0 {
                return Err(playbook_not_found(playbook));
            }

            tx.commit().await?;
            Ok(())
        })
    }

    fn rename_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut renamed = self.fetch_workflow(playbook, workflow).await?;
            renamed.name = new_name.to_string();

            sqlx::query(
                r#"
                UPDATE workflows SET name = ?, definition = ?, updated_at = CURRENT_TIMESTAMP
                WHERE playbook = ? AND name = ?
                "#,
            )
            .bind(new_name)
            .bind(serde_json::to_string(&renamed)?)
            .bind(playbook)
            .bind(workflow)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn duplicate_workflow<'a>(
        &'a self,
        playbook: &'a str,
        workflow: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<Workflow>> {
        Box::pin(async move {
            let mut copy = self.fetch_workflow(playbook, workflow).await?;
            copy.uid = Some(Uuid::new_v4().to_string());
            copy.name = new_name.to_string();

            self.insert_workflow(playbook, &copy).await?;
            Ok(copy)
        })
    }

    fn delete_workflow<'a>(&'a self, playbook: &'a str, workflow: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let deleted = sqlx::query("DELETE FROM workflows WHERE playbook = ? AND name = ?")
                .bind(playbook)
                .bind(workflow)
                .execute(&self.pool)
                .await?;
            if deleted.rows_affected() == 0 {
                return Err(not_found(playbook, workflow));
            }
            Ok(())
        })
    }
}

impl CatalogSource for SqlitePlaybookStore {
    fn list_apps(&self) -> BoxFuture<'_, Result<Vec<AppApi>>> {
        Box::pin(async move {
            let rows = sqlx::query("SELECT definition FROM app_apis ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

            let mut apps = Vec::with_capacity(rows.len());
            for row in rows {
                let definition: String = row.get("definition");
                apps.push(serde_json::from_str(&definition)?);
            }
            Ok(apps)
        })
    }

    fn list_devices(&self) -> BoxFuture<'_, Result<Vec<Device>>> {
        Box::pin(async move {
            let rows = sqlx::query("SELECT definition FROM devices ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

            let mut devices = Vec::with_capacity(rows.len());
            for row in rows {
                let definition: String = row.get("definition");
                devices.push(serde_json::from_str(&definition)?);
            }
            Ok(devices)
        })
    }
}
