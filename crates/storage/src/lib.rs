use anyhow::{bail, Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Group, GroupId};

/// Inventory groups and their parent/child links.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_group(&self, name: &str) -> Result<GroupId> {
        let name = name.trim();
        if name.is_empty() {
            bail!("group name must not be empty");
        }

        let rec = sqlx::query("INSERT INTO groups (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(GroupId(rec.get::<i64, _>(0)))
    }

    pub async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>> {
        let row = sqlx::query("SELECT id, name FROM groups WHERE id = ?")
            .bind(group_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Group::new(GroupId(r.get::<i64, _>(0)), r.get::<String, _>(1))))
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query("SELECT id, name FROM groups ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Group::new(GroupId(r.get::<i64, _>(0)), r.get::<String, _>(1)))
            .collect())
    }

    pub async fn children_of(&self, parent: GroupId) -> Result<Vec<GroupId>> {
        let rows = sqlx::query(
            "SELECT child_id FROM group_children WHERE parent_id = ? ORDER BY child_id",
        )
        .bind(parent.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| GroupId(r.get::<i64, _>(0)))
            .collect())
    }

    pub async fn parents_of(&self, child: GroupId) -> Result<Vec<GroupId>> {
        let rows = sqlx::query(
            "SELECT parent_id FROM group_children WHERE child_id = ? ORDER BY parent_id",
        )
        .bind(child.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| GroupId(r.get::<i64, _>(0)))
            .collect())
    }

    /// Whether `candidate` is reachable from `ancestor` through child links.
    pub async fn is_descendant(&self, ancestor: GroupId, candidate: GroupId) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            "WITH RECURSIVE descendants(id) AS (
                 SELECT child_id FROM group_children WHERE parent_id = ?
                 UNION
                 SELECT gc.child_id
                 FROM group_children gc
                 INNER JOIN descendants d ON gc.parent_id = d.id
             )
             SELECT EXISTS(SELECT 1 FROM descendants WHERE id = ?)",
        )
        .bind(ancestor.0)
        .bind(candidate.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(found != 0)
    }

    pub async fn associate(&self, child: GroupId, parent: GroupId) -> Result<()> {
        if child == parent {
            bail!("group {child} cannot be associated with itself");
        }
        self.require_group(child).await?;
        self.require_group(parent).await?;

        if self.is_descendant(child, parent).await? {
            bail!(
                "cyclical group association: group {parent} is a descendant of group {child}"
            );
        }

        let inserted = sqlx::query(
            "INSERT INTO group_children (parent_id, child_id) VALUES (?, ?)
             ON CONFLICT(parent_id, child_id) DO NOTHING",
        )
        .bind(parent.0)
        .bind(child.0)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            bail!("group {child} is already a child of group {parent}");
        }
        Ok(())
    }

    pub async fn disassociate(&self, child: GroupId, parent: GroupId) -> Result<()> {
        let removed =
            sqlx::query("DELETE FROM group_children WHERE parent_id = ? AND child_id = ?")
                .bind(parent.0)
                .bind(child.0)
                .execute(&self.pool)
                .await?
                .rows_affected();

        if removed == 0 {
            bail!("group {child} is not a child of group {parent}");
        }
        Ok(())
    }

    async fn require_group(&self, group_id: GroupId) -> Result<Group> {
        self.get_group(group_id)
            .await?
            .with_context(|| format!("group {group_id} does not exist"))
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
