// ==========================================
// 联系人导入 - 联系人 Repository 实现
// ==========================================
// 职责: 基于 rusqlite 的联系人存储
// 存储: contacts 表（interests 以 JSON 数组保存，建表语句见 db.rs）
// ==========================================

use crate::db::{ensure_contacts_table, open_sqlite_connection};
use crate::domain::contact::{CandidateRecord, Gender};
use crate::repository::contact_repo::ContactRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 已存储的联系人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContact {
    pub contact_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub interests: Vec<String>,
    pub source: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// SqliteContactRepository
// ==========================================
pub struct SqliteContactRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContactRepository {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        ensure_contacts_table(&conn)?;
        Ok(())
    }

    /// 按写入顺序列出全部联系人
    pub fn list_contacts(&self) -> RepositoryResult<Vec<StoredContact>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT contact_id, name, email, phone, age, gender, state, city,
                   interests, source, notes, created_at
            FROM contacts
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, Option<String>>(10)?,
                row.get::<_, DateTime<Utc>>(11)?,
            ))
        })?;

        let mut contacts = Vec::new();
        for row in rows {
            let (id, name, email, phone, age, gender, state, city, interests, source, notes, created_at) =
                row?;
            contacts.push(StoredContact {
                contact_id: id,
                name,
                email,
                phone,
                age: age.and_then(|a| u8::try_from(a).ok()),
                gender: gender.as_deref().and_then(|g| g.parse::<Gender>().ok()),
                state,
                city,
                interests: serde_json::from_str(&interests)?,
                source,
                notes,
                created_at,
            });
        }
        Ok(contacts)
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn insert_contact(&self, record: &CandidateRecord) -> RepositoryResult<String> {
        let contact_id = Uuid::new_v4().to_string();
        let interests = serde_json::to_string(record.interests.as_deref().unwrap_or(&[]))?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO contacts (
                contact_id, name, email, phone, age, gender, state, city,
                interests, source, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                contact_id,
                record.name,
                record.email,
                record.phone,
                record.age,
                record.gender.map(|g| g.as_str()),
                record.state,
                record.city,
                interests,
                record.source,
                record.notes,
                Utc::now(),
            ],
        )?;

        Ok(contact_id)
    }

    async fn count_contacts(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
