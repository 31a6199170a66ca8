// ==========================================
// 联系人导入 - 表头判定器
// ==========================================
// 职责: 判断第 0 行是否为表头（关键词启发式）
// 规则: 任一单元格命中关键词，且该行没有邮箱/电话形态的单元格
//       → 第 0 行作为表头，其余为数据行
// ==========================================

use crate::domain::contact::RawGrid;
use crate::domain::schema::ImportSchema;
use crate::importer::column_sampler::{classify_cell, CellKind};
use crate::importer::error::{ImportError, ImportResult};

/// 短于该长度的关键词只接受整词命中
const PREFIX_MATCH_MIN_LEN: usize = 4;

/// 表头标签最多包含的词数
const MAX_LABEL_WORDS: usize = 3;

/// 判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDecision {
    pub has_header: bool,
    /// 小写后的表头标签（无表头时为空）
    pub header_labels: Vec<String>,
    /// 数据行
    pub data: RawGrid,
}

pub struct HeaderClassifier {
    keywords: Vec<String>,
}

impl HeaderClassifier {
    pub fn new(schema: &ImportSchema) -> Self {
        Self {
            keywords: schema.effective_header_keywords(),
        }
    }

    /// 单元格是否像表头标签
    ///
    /// 命中条件（均在小写、去空白后判断）:
    /// - 与关键词完全相等
    /// - 以关键词整词开头（如 "nome completo"、"phone number"）
    /// - 以关键词开头且关键词不短于 4 个字符（如 "observações"、"interesses"）
    ///
    /// 含 '@' 或超过 3 个词的单元格不是标签，不参与匹配
    pub fn cell_matches(&self, cell: &str) -> bool {
        let cell = cell.trim().to_lowercase();
        if cell.is_empty() || cell.contains('@') {
            return false;
        }
        if cell.split_whitespace().count() > MAX_LABEL_WORDS {
            return false;
        }

        self.keywords.iter().any(|kw| {
            cell == *kw
                || starts_with_word(&cell, kw)
                || (kw.chars().count() >= PREFIX_MATCH_MIN_LEN && cell.starts_with(kw.as_str()))
        })
    }

    /// 任一单元格命中关键词，且没有单元格呈现邮箱或电话形态
    pub fn is_header_row(&self, row: &[String]) -> bool {
        let looks_like_data = row
            .iter()
            .filter(|cell| !cell.trim().is_empty())
            .any(|cell| matches!(classify_cell(cell), CellKind::Email | CellKind::Phone));
        if looks_like_data {
            return false;
        }
        row.iter().any(|cell| self.cell_matches(cell))
    }

    /// 对整张表做表头判定
    ///
    /// # 返回
    /// - Ok(HeaderDecision)
    /// - Err(EmptyContent): 判定后没有任何数据行
    pub fn classify(&self, grid: &RawGrid) -> ImportResult<HeaderDecision> {
        let first_row = grid.row(0).ok_or(ImportError::EmptyContent)?;

        let decision = if self.is_header_row(first_row) {
            HeaderDecision {
                has_header: true,
                header_labels: first_row
                    .iter()
                    .map(|c| c.trim().to_lowercase())
                    .collect(),
                data: grid.skip_rows(1),
            }
        } else {
            HeaderDecision {
                has_header: false,
                header_labels: Vec::new(),
                data: grid.clone(),
            }
        };

        if decision.data.is_empty() {
            return Err(ImportError::EmptyContent);
        }

        Ok(decision)
    }
}

/// haystack 以整词 kw 开头（kw 之后不是字母数字）
fn starts_with_word(haystack: &str, kw: &str) -> bool {
    if kw.is_empty() {
        return false;
    }
    haystack
        .strip_prefix(kw)
        .map_or(false, |rest| rest.chars().next().map_or(true, |c| !c.is_alphanumeric()))
}
