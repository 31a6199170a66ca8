// ==========================================
// 联系人导入 - 联系人领域模型
// ==========================================
// 职责: RawGrid / 列角色 / 候选记录 / 行级错误 / 导入会话
// 红线: 单元格缺失一律视为空字符串，不存在 null
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldIndices;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// RawGrid - 原始单元格表
// ==========================================
// 用途: 格式读取器输出，语义解释之前的只读快照
// 说明: 行长度可以不一致，越界单元格按 "" 读取
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// 便于测试构造
    pub fn from_strs(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// 读取单元格；行或列越界时返回 ""
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|c| c.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 最宽行的列数
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// 去掉前 n 行（表头）后的数据部分
    pub fn skip_rows(&self, n: usize) -> RawGrid {
        RawGrid {
            rows: self.rows.iter().skip(n).cloned().collect(),
        }
    }
}

impl From<Vec<Vec<String>>> for RawGrid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

// ==========================================
// CanonicalField - 十个标准字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Name,
    Email,
    Phone,
    Age,
    Gender,
    State,
    City,
    Interests,
    Source,
    Notes,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Name,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::Age,
        CanonicalField::Gender,
        CanonicalField::State,
        CanonicalField::City,
        CanonicalField::Interests,
        CanonicalField::Source,
        CanonicalField::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Email => "email",
            CanonicalField::Phone => "phone",
            CanonicalField::Age => "age",
            CanonicalField::Gender => "gender",
            CanonicalField::State => "state",
            CanonicalField::City => "city",
            CanonicalField::Interests => "interests",
            CanonicalField::Source => "source",
            CanonicalField::Notes => "notes",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// ColumnRole - 无表头路径推断出的列语义
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Name,
    Email,
    Phone,
    Age,
    Gender,
    State,
    City,
    Interests,
    Source,
    Notes,
    Unknown,
}

impl ColumnRole {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ColumnRole::Unknown)
    }
}

// ==========================================
// Gender - 封闭取值集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Masculine,
    Feminine,
    NonBinary,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::NonBinary => "non_binary",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    /// 只接受 as_str 产生的存储名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "masculine" => Ok(Gender::Masculine),
            "feminine" => Ok(Gender::Feminine),
            "non_binary" => Ok(Gender::NonBinary),
            "other" => Ok(Gender::Other),
            "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            other => Err(format!("未知性别: {}", other)),
        }
    }
}

// ==========================================
// CandidateRecord - 待确认的联系人草稿
// ==========================================
// 生命周期: 规范化器创建 → 预览列表持有 → 执行器消费一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u8>, // 0 < age < 150
    pub gender: Option<Gender>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub interests: Option<Vec<String>>, // 仅标准词表内的条目
    pub source: String,
    pub notes: Option<String>,

    // 来源行号（与 RowError 同一口径）
    pub row_number: usize,
}

// ==========================================
// RowError - 行级可恢复错误
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowErrorKind {
    /// 姓名为空，整行跳过
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize, // 1 起始，按源文件行计
    pub kind: RowErrorKind,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.row_number, self.reason)
    }
}

// ==========================================
// ImportPreview - 交给操作员审阅的结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPreview {
    pub preview: Vec<CandidateRecord>,
    pub errors: Vec<RowError>,
}

impl ImportPreview {
    /// 错误信息的字符串形式（对外契约为 string[]）
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// 被跳过的空姓名行数
    pub fn skipped_for_empty_name(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.kind == RowErrorKind::EmptyName)
            .count()
    }
}

// ==========================================
// 执行阶段结果
// ==========================================

/// 单条提交失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSubmission {
    pub position: usize, // 预览列表中的下标
    pub row_number: usize,
    pub name: String,
    pub reason: String,
}

/// 执行器终态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: usize,
    pub errors: usize,
    pub failed: Vec<FailedSubmission>,
}

/// 进度事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub processed: usize,
    pub total: usize,
    pub percent: u8, // 0..=100，单调不减
    pub success: usize,
    pub errors: usize,
}

impl ImportProgress {
    pub fn percent_of(processed: usize, total: usize) -> u8 {
        if total == 0 {
            return 100;
        }
        ((processed.min(total) * 100) / total) as u8
    }
}

// ==========================================
// ImportSession - 单次上传的临时聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// 预览已生成，等待操作员确认
    Previewed,
    /// 执行器已消费预览
    Executed,
    /// 操作员取消，预览被丢弃
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    pub session_id: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,

    pub grid: RawGrid,
    pub has_header: bool,
    pub header_labels: Vec<String>,
    pub column_indices: FieldIndices,
    pub inferred_roles: Option<Vec<ColumnRole>>, // 仅无表头路径

    pub preview: Vec<CandidateRecord>,
    pub errors: Vec<RowError>,
    pub progress: u8,
    pub result: Option<ImportOutcome>,
    pub state: SessionState,
}

impl ImportSession {
    /// 数据行数（不含表头）
    pub fn data_row_count(&self) -> usize {
        if self.has_header {
            self.grid.len().saturating_sub(1)
        } else {
            self.grid.len()
        }
    }

    /// 操作员取消：丢弃预览，之后不可再执行
    pub fn cancel(&mut self) -> ImportResult<()> {
        if self.state != SessionState::Previewed {
            return Err(ImportError::SessionAlreadyExecuted(self.session_id.clone()));
        }
        self.preview.clear();
        self.state = SessionState::Cancelled;
        Ok(())
    }

    pub fn preview_view(&self) -> ImportPreview {
        ImportPreview {
            preview: self.preview.clone(),
            errors: self.errors.clone(),
        }
    }
}
