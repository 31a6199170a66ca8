// ==========================================
// 联系人导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{ensure_config_table, open_sqlite_connection};
use crate::domain::schema::ImportSchema;
use crate::importer::column_sampler::DEFAULT_SAMPLE_ROWS;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_table(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并确保 config_kv 存在（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_config_table(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let read_error = |message: String| ImportError::ConfigReadError {
            key: key.to_string(),
            message,
        };

        let conn = self
            .conn
            .lock()
            .map_err(|e| read_error(format!("锁获取失败: {}", e)))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(read_error(e.to_string())),
        }
    }

    /// 读取并解析正整数配置；缺失时返回默认值，格式错误时报错
    fn get_positive_usize(&self, key: &str, default: usize) -> ImportResult<usize> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<usize>() {
            Ok(v) if v >= 1 => Ok(v),
            _ => Err(ImportError::ConfigReadError {
                key: key.to_string(),
                message: format!("期望正整数，实际为 {:?}", raw),
            }),
        }
    }

    /// 读取非空字符串配置（空白视为未配置）
    fn get_non_blank(&self, key: &str) -> ImportResult<Option<String>> {
        Ok(self
            .get_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - CLI 启动时记录本次导入使用的配置
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_sample_rows(&self) -> ImportResult<usize> {
        self.get_positive_usize(config_keys::SAMPLE_ROWS, DEFAULT_SAMPLE_ROWS)
    }

    async fn get_schema_override(&self) -> ImportResult<Option<ImportSchema>> {
        let Some(raw) = self.get_non_blank(config_keys::SCHEMA)? else {
            return Ok(None);
        };

        ImportSchema::from_json(&raw)
            .map(Some)
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::SCHEMA.to_string(),
                message: e.to_string(),
            })
    }

    async fn get_default_source(&self) -> ImportResult<Option<String>> {
        self.get_non_blank(config_keys::DEFAULT_SOURCE)
    }

    async fn get_executor_concurrency(&self) -> ImportResult<usize> {
        self.get_positive_usize(config_keys::EXECUTOR_CONCURRENCY, 1)
    }

    async fn get_extractor_url(&self) -> ImportResult<Option<String>> {
        self.get_non_blank(config_keys::EXTRACTOR_URL)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 预览
    pub const SAMPLE_ROWS: &str = "import/sample_rows";
    pub const SCHEMA: &str = "import/schema";
    pub const DEFAULT_SOURCE: &str = "import/default_source";

    // 执行
    pub const EXECUTOR_CONCURRENCY: &str = "import/executor_concurrency";

    // 外部服务
    pub const EXTRACTOR_URL: &str = "import/extractor_url";
}
