// ==========================================
// 联系人导入 - 列语义推断（无表头路径）
// ==========================================
// 职责: 抽样前若干行，逐单元格独立判定，按多数票为每列指定角色
// 优先级: email > phone > name（单元格判定互斥，同一列不会同时满足两种）
// 输出: 合成表头标签，使后续字段映射与有表头路径完全一致
// ==========================================

use crate::domain::contact::{ColumnRole, RawGrid};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 默认抽样行数
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// 电话判定: 去掉非数字后的最少位数
const MIN_PHONE_DIGITS: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// 字母（含重音）、空白、连字符、撇号、句点
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\s'.\-]+$").unwrap());

/// 单元格判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Email,
    Phone,
    Name,
    None,
}

/// 判定单个单元格（已去首尾空白的非空值）
pub fn classify_cell(value: &str) -> CellKind {
    let value = value.trim();
    if EMAIL_PATTERN.is_match(value) {
        return CellKind::Email;
    }
    if value.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS {
        return CellKind::Phone;
    }
    if value.chars().count() >= 2 && NAME_PATTERN.is_match(value) {
        return CellKind::Name;
    }
    CellKind::None
}

/// 推断结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledColumns {
    pub roles: Vec<ColumnRole>,
    pub header_labels: Vec<String>,
}

pub struct ColumnSampler {
    sample_rows: usize,
}

impl Default for ColumnSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_ROWS)
    }
}

impl ColumnSampler {
    pub fn new(sample_rows: usize) -> Self {
        Self {
            sample_rows: sample_rows.max(1),
        }
    }

    /// 为每列推断角色并合成表头
    pub fn infer(&self, data: &RawGrid) -> SampledColumns {
        let width = data.width();
        let sample_len = data.len().min(self.sample_rows);

        let mut roles: Vec<ColumnRole> = (0..width)
            .map(|col| self.vote(data, col, sample_len))
            .collect();

        // 无表头导入必须有姓名列
        if !roles.contains(&ColumnRole::Name) {
            if let Some(slot) = roles.iter_mut().find(|r| r.is_unknown()) {
                *slot = ColumnRole::Name;
            }
        }

        let header_labels = roles
            .iter()
            .enumerate()
            .map(|(idx, role)| synthesized_label(idx, *role))
            .collect();

        debug!(?roles, sample_len, "列语义推断完成");
        SampledColumns {
            roles,
            header_labels,
        }
    }

    /// 单列多数票：超过一半的非空样本一致才指定角色
    fn vote(&self, data: &RawGrid, col: usize, sample_len: usize) -> ColumnRole {
        let mut non_empty = 0usize;
        let mut emails = 0usize;
        let mut phones = 0usize;
        let mut names = 0usize;

        for row in 0..sample_len {
            let value = data.cell(row, col).trim();
            if value.is_empty() {
                continue;
            }
            non_empty += 1;
            match classify_cell(value) {
                CellKind::Email => emails += 1,
                CellKind::Phone => phones += 1,
                CellKind::Name => names += 1,
                CellKind::None => {}
            }
        }

        if non_empty == 0 {
            return ColumnRole::Unknown;
        }

        let majority = |count: usize| count * 2 > non_empty;
        if majority(emails) {
            ColumnRole::Email
        } else if majority(phones) {
            ColumnRole::Phone
        } else if majority(names) {
            ColumnRole::Name
        } else {
            ColumnRole::Unknown
        }
    }
}

/// 合成表头标签；未识别列为 "colunaN"（N 从 1 起）
fn synthesized_label(index: usize, role: ColumnRole) -> String {
    match role {
        ColumnRole::Name => "nome".to_string(),
        ColumnRole::Email => "email".to_string(),
        ColumnRole::Phone => "telefone".to_string(),
        _ => format!("coluna{}", index + 1),
    }
}
