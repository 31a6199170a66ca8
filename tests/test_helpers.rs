// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供临时数据库、夹具文件读取、候选联系人生成等功能
// ==========================================
#![allow(dead_code)]

use contact_import::domain::CandidateRecord;
use contact_import::repository::error::{RepositoryError, RepositoryResult};
use contact_import::repository::ContactRepository;
use async_trait::async_trait;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = contact_import::db::open_sqlite_connection(&db_path)?;
    contact_import::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 夹具文件路径
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// 读取夹具文件
pub fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("夹具文件不存在")
}

/// 生成 n 条有效候选联系人（row_number 从 2 开始）
pub fn make_candidates(n: usize) -> Vec<CandidateRecord> {
    (1..=n)
        .map(|i| CandidateRecord {
            name: format!("Contato {}", i),
            email: Some(format!("contato{}@exemplo.com", i)),
            phone: None,
            age: None,
            gender: None,
            state: None,
            city: None,
            interests: None,
            source: "Importação".to_string(),
            notes: None,
            row_number: i + 1,
        })
        .collect()
}

/// 按名称拒绝的持久化端（模拟远程 API 的部分失败）
pub struct FlakyRepository {
    fail_names: Vec<String>,
    accepted: Mutex<Vec<String>>,
}

impl FlakyRepository {
    pub fn new(fail_names: &[&str]) -> Self {
        Self {
            fail_names: fail_names.iter().map(|s| s.to_string()).collect(),
            accepted: Mutex::new(Vec::new()),
        }
    }

    pub fn accepted(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContactRepository for FlakyRepository {
    async fn insert_contact(&self, record: &CandidateRecord) -> RepositoryResult<String> {
        if self.fail_names.contains(&record.name) {
            return Err(RepositoryError::Rejected(format!("HTTP 500 para {}", record.name)));
        }
        self.accepted.lock().unwrap().push(record.name.clone());
        Ok(format!("id-{}", record.name))
    }

    async fn count_contacts(&self) -> RepositoryResult<usize> {
        Ok(self.accepted.lock().unwrap().len())
    }
}
