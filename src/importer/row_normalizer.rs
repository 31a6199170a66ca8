// ==========================================
// 联系人导入 - 行规范化 / 校验
// ==========================================
// 职责: 单行 → CandidateRecord 或带原因的 RowError
// 规则: TRIM / 首字母大写 / 空值 → None / 年龄区间 / 性别同义词 / 兴趣词表
// 红线: 对任意单元格内容都不 panic、不返回致命错误；行与行互不依赖
// ==========================================

use crate::domain::contact::{
    CandidateRecord, CanonicalField, Gender, ImportPreview, RawGrid, RowError, RowErrorKind,
};
use crate::domain::schema::ImportSchema;
use crate::i18n;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{FieldIndices, FieldMapper};
use tracing::{info, warn};

/// 年龄开区间 (0, 150)
const AGE_MAX_EXCLUSIVE: u32 = 150;

// ==========================================
// 纯函数清洗规则
// ==========================================

/// 每个空白分隔的词首字母大写、其余小写；幂等
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    // 大写展开为多个字符时（"ß" → "SS"）只保留首字符大写
                    let mut upper = first.to_uppercase();
                    upper
                        .next()
                        .into_iter()
                        .chain(upper.flat_map(|c| c.to_lowercase()))
                        .chain(chars.flat_map(|c| c.to_lowercase()))
                        .collect::<String>()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// TRIM 后空串 → None
pub fn normalize_null(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 年龄: 取开头连续数字解析，仅保留 0 < age < 150
pub fn parse_age(value: &str) -> Option<u8> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let age: u32 = digits.parse().ok()?;
    if age > 0 && age < AGE_MAX_EXCLUSIVE {
        u8::try_from(age).ok()
    } else {
        None
    }
}

/// 性别: 小写后按组优先级做同义词全等匹配，第一个命中的组胜出
pub fn resolve_gender(value: &str, schema: &ImportSchema) -> Option<Gender> {
    let needle = value.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    schema
        .gender_groups
        .iter()
        .find(|group| group.synonyms.iter().any(|s| s.to_lowercase() == needle))
        .map(|group| group.gender)
}

/// 兴趣: 按 , ; | 切分，只保留与词表大小写不敏感全等的条目（恢复词表写法，去重）
pub fn filter_interests(value: &str, schema: &ImportSchema) -> Option<Vec<String>> {
    let mut kept: Vec<String> = Vec::new();

    for token in value.split(|c: char| c == ',' || c == ';' || c == '|') {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        if let Some(canonical) = schema
            .interest_vocabulary
            .iter()
            .find(|v| v.to_lowercase() == token)
        {
            if !kept.contains(canonical) {
                kept.push(canonical.clone());
            }
        }
    }

    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

// ==========================================
// RowNormalizer
// ==========================================
pub struct RowNormalizer<'a> {
    schema: &'a ImportSchema,
    indices: FieldIndices,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(schema: &'a ImportSchema, indices: FieldIndices) -> Self {
        Self { schema, indices }
    }

    /// 取映射列的单元格；未映射或越界 → ""
    fn cell<'r>(&self, row: &'r [String], field: CanonicalField) -> &'r str {
        self.indices
            .get(field)
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// 规范化单行
    ///
    /// # 参数
    /// - row: 数据行
    /// - row_number: 源文件行号（1 起始）
    ///
    /// # 返回
    /// - Ok(CandidateRecord)
    /// - Err(RowError): 姓名为空，整行跳过
    pub fn normalize_row(&self, row: &[String], row_number: usize) -> Result<CandidateRecord, RowError> {
        let name = self.cell(row, CanonicalField::Name);
        if name.is_empty() {
            return Err(RowError {
                row_number,
                kind: RowErrorKind::EmptyName,
                reason: i18n::t("import.row_empty_name"),
            });
        }

        let source = normalize_null(self.cell(row, CanonicalField::Source))
            .unwrap_or_else(|| self.schema.default_source.clone());

        Ok(CandidateRecord {
            name: title_case(name),
            email: normalize_null(self.cell(row, CanonicalField::Email)),
            phone: normalize_null(self.cell(row, CanonicalField::Phone)),
            age: parse_age(self.cell(row, CanonicalField::Age)),
            gender: resolve_gender(self.cell(row, CanonicalField::Gender), self.schema),
            state: normalize_null(self.cell(row, CanonicalField::State)),
            city: normalize_null(self.cell(row, CanonicalField::City)).map(|c| title_case(&c)),
            interests: filter_interests(self.cell(row, CanonicalField::Interests), self.schema),
            source,
            notes: normalize_null(self.cell(row, CanonicalField::Notes)),
            row_number,
        })
    }
}

/// 两条读取路径（有表头 / 无表头）汇合后的唯一规范化入口
///
/// # 参数
/// - rows: 数据行（不含表头）
/// - header_labels: 真实或合成的表头标签
/// - schema: 导入规则
/// - first_row_number: 第一条数据行在源文件中的行号
///
/// # 返回
/// - Ok((FieldIndices, ImportPreview)): preview.len() + 跳过行数 == rows.len()
/// - Err(NoNameColumn): 处理任何行之前即失败
pub fn normalize_rows(
    rows: &RawGrid,
    header_labels: &[String],
    schema: &ImportSchema,
    first_row_number: usize,
) -> ImportResult<(FieldIndices, ImportPreview)> {
    let indices = FieldMapper::new(schema).resolve(header_labels)?;
    let normalizer = RowNormalizer::new(schema, indices.clone());

    let mut preview = ImportPreview::default();
    for (offset, row) in rows.rows().iter().enumerate() {
        let row_number = first_row_number + offset;
        match normalizer.normalize_row(row, row_number) {
            Ok(record) => preview.preview.push(record),
            Err(row_error) => {
                warn!(row_number, reason = %row_error.reason, "行已跳过");
                preview.errors.push(row_error);
            }
        }
    }

    info!(
        total = rows.len(),
        accepted = preview.preview.len(),
        skipped = preview.errors.len(),
        "行规范化完成"
    );
    Ok((indices, preview))
}
