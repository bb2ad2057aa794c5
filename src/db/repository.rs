//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use std::collections::HashSet;

use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::Member;
use crate::tree::MemberStore;

/// Whether an upsert inserted a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all brothers in insertion order.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query("SELECT nickname, name, big, year FROM brothers ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a brother by nickname.
    pub async fn get_member(&self, nickname: &str) -> Result<Option<Member>, AppError> {
        let row = sqlx::query("SELECT nickname, name, big, year FROM brothers WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// List the littles of `big` in insertion order.
    pub async fn get_littles(&self, big: &str) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(
            "SELECT nickname, name, big, year FROM brothers WHERE big = ? ORDER BY rowid",
        )
        .bind(big)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Substring search over nickname, name and year.
    pub async fn search(&self, query: &str) -> Result<Vec<Member>, AppError> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query(
            r#"SELECT nickname, name, big, year FROM brothers
               WHERE nickname LIKE ? OR name LIKE ? OR CAST(year AS TEXT) LIKE ?
               ORDER BY rowid"#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Create a new brother. Fails if the nickname is taken.
    pub async fn create_member(&self, member: &Member) -> Result<Member, AppError> {
        if self.get_member(&member.nickname).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Brother {} already exists",
                member.nickname
            )));
        }
        // Orphans may already name this nickname as their big.
        self.ensure_acyclic(&member.nickname, member.big.as_deref())
            .await?;

        sqlx::query("INSERT INTO brothers (nickname, name, big, year) VALUES (?, ?, ?, ?)")
            .bind(&member.nickname)
            .bind(&member.name)
            .bind(&member.big)
            .bind(member.year)
            .execute(&self.pool)
            .await?;

        tracing::info!("Created brother {}", member.nickname);
        Ok(member.clone())
    }

    /// Replace every field of an existing brother except the nickname.
    pub async fn update_member(&self, member: &Member) -> Result<Member, AppError> {
        if self.get_member(&member.nickname).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Brother {} not found",
                member.nickname
            )));
        }
        self.ensure_acyclic(&member.nickname, member.big.as_deref())
            .await?;

        sqlx::query("UPDATE brothers SET name = ?, big = ?, year = ? WHERE nickname = ?")
            .bind(&member.name)
            .bind(&member.big)
            .bind(member.year)
            .bind(&member.nickname)
            .execute(&self.pool)
            .await?;

        tracing::info!("Updated brother {}", member.nickname);
        Ok(member.clone())
    }

    /// Create the brother if absent, otherwise replace the stored fields.
    pub async fn upsert_member(&self, member: &Member) -> Result<Upserted, AppError> {
        if self.get_member(&member.nickname).await?.is_some() {
            self.update_member(member).await?;
            Ok(Upserted::Updated)
        } else {
            self.create_member(member).await?;
            Ok(Upserted::Created)
        }
    }

    /// Make `little` a little of `big`. Both must exist.
    pub async fn add_little(&self, big: &str, little: &str) -> Result<(), AppError> {
        if self.get_member(big).await?.is_none() {
            return Err(AppError::NotFound(format!("Brother {} not found", big)));
        }
        if self.get_member(little).await?.is_none() {
            return Err(AppError::NotFound(format!("Brother {} not found", little)));
        }
        self.ensure_acyclic(little, Some(big)).await?;

        sqlx::query("UPDATE brothers SET big = ? WHERE nickname = ?")
            .bind(big)
            .bind(little)
            .execute(&self.pool)
            .await?;

        tracing::info!("Added {} as a little of {}", little, big);
        Ok(())
    }

    /// Change a brother's nickname and re-point all littles, atomically.
    pub async fn rekey_member(&self, old: &str, new: &str) -> Result<(), AppError> {
        let existing = self
            .get_member(old)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Brother {} not found", old)))?;
        if old == new {
            return Ok(());
        }
        if self.get_member(new).await?.is_some() {
            return Err(AppError::Conflict(format!("Brother {} already exists", new)));
        }
        // Orphans left pointing at `new` are adopted by the rename.
        self.ensure_acyclic(new, existing.big.as_deref()).await?;

        let mut tx = self.pool.begin().await?;

        let renamed = sqlx::query("UPDATE brothers SET nickname = ? WHERE nickname = ?")
            .bind(new)
            .bind(old)
            .execute(&mut *tx)
            .await?;
        if renamed.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Brother {} not found", old)));
        }

        let repointed = sqlx::query("UPDATE brothers SET big = ? WHERE big = ?")
            .bind(new)
            .bind(old)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Renamed brother {} to {} ({} littles re-pointed)",
            old,
            new,
            repointed.rows_affected()
        );
        Ok(())
    }

    /// Delete a brother. Littles keep their now-dangling big.
    pub async fn delete_member(&self, nickname: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM brothers WHERE nickname = ?")
            .bind(nickname)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Brother {} not found", nickname)));
        }

        tracing::info!("Deleted brother {}", nickname);
        Ok(())
    }

    /// Reject a big assignment that would put `nickname` on its own ancestor chain.
    async fn ensure_acyclic(&self, nickname: &str, big: Option<&str>) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        let mut current = big.map(str::to_string);

        while let Some(ancestor) = current {
            if ancestor == nickname {
                return Err(AppError::Validation(format!(
                    "{} cannot be a little of their own descendant",
                    nickname
                )));
            }
            // A stored loop above that never reaches `nickname`
            if !seen.insert(ancestor.clone()) {
                break;
            }
            current = self.get_member(&ancestor).await?.and_then(|m| m.big);
        }

        Ok(())
    }
}

impl MemberStore for Repository {
    async fn get_member(&self, nickname: &str) -> Result<Option<Member>, AppError> {
        Repository::get_member(self, nickname).await
    }

    async fn get_littles(&self, big: &str) -> Result<Vec<Member>, AppError> {
        Repository::get_littles(self, big).await
    }
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Member {
    Member {
        nickname: row.get("nickname"),
        name: row.get("name"),
        big: row.get("big"),
        year: row.get("year"),
    }
}
