// ==========================================
// 联系人导入 - 字段映射器实现
// ==========================================
// 职责: 表头标签（真实或合成） → 标准字段列下标
// 规则: 自左向右扫描，第一个"包含"任一别名的表头胜出（子串匹配，非全等）
// 红线: name 是唯一必填字段，解析不到则整个导入失败
// ==========================================

use crate::domain::contact::CanonicalField;
use crate::domain::schema::ImportSchema;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 标准字段 → 列下标（None 表示未映射）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIndices {
    pub name: Option<usize>,
    pub email: Option<usize>,
    pub phone: Option<usize>,
    pub age: Option<usize>,
    pub gender: Option<usize>,
    pub state: Option<usize>,
    pub city: Option<usize>,
    pub interests: Option<usize>,
    pub source: Option<usize>,
    pub notes: Option<usize>,
}

impl FieldIndices {
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        match field {
            CanonicalField::Name => self.name,
            CanonicalField::Email => self.email,
            CanonicalField::Phone => self.phone,
            CanonicalField::Age => self.age,
            CanonicalField::Gender => self.gender,
            CanonicalField::State => self.state,
            CanonicalField::City => self.city,
            CanonicalField::Interests => self.interests,
            CanonicalField::Source => self.source,
            CanonicalField::Notes => self.notes,
        }
    }

    fn set(&mut self, field: CanonicalField, index: Option<usize>) {
        let slot = match field {
            CanonicalField::Name => &mut self.name,
            CanonicalField::Email => &mut self.email,
            CanonicalField::Phone => &mut self.phone,
            CanonicalField::Age => &mut self.age,
            CanonicalField::Gender => &mut self.gender,
            CanonicalField::State => &mut self.state,
            CanonicalField::City => &mut self.city,
            CanonicalField::Interests => &mut self.interests,
            CanonicalField::Source => &mut self.source,
            CanonicalField::Notes => &mut self.notes,
        };
        *slot = index;
    }

    /// 兼容对外契约的 -1 表示法
    pub fn as_signed(&self, field: CanonicalField) -> i64 {
        self.get(field).map_or(-1, |i| i as i64)
    }
}

pub struct FieldMapper<'a> {
    schema: &'a ImportSchema,
}

impl<'a> FieldMapper<'a> {
    pub fn new(schema: &'a ImportSchema) -> Self {
        Self { schema }
    }

    /// 单个字段：第一个包含任一别名的表头下标
    pub fn find_column(&self, header_labels: &[String], field: CanonicalField) -> Option<usize> {
        let aliases: Vec<String> = self
            .schema
            .aliases_for(field)
            .iter()
            .filter(|a| !a.is_empty())
            .map(|a| a.to_lowercase())
            .collect();

        header_labels.iter().position(|label| {
            let label = label.to_lowercase();
            aliases.iter().any(|alias| label.contains(alias.as_str()))
        })
    }

    /// 解析全部十个标准字段
    ///
    /// # 返回
    /// - Ok(FieldIndices)
    /// - Err(NoNameColumn): 无法定位姓名列
    pub fn resolve(&self, header_labels: &[String]) -> ImportResult<FieldIndices> {
        let mut indices = FieldIndices::default();
        for field in CanonicalField::ALL {
            indices.set(field, self.find_column(header_labels, field));
        }

        if indices.name.is_none() {
            return Err(ImportError::NoNameColumn {
                headers: header_labels.to_vec(),
            });
        }

        debug!(?indices, "字段映射完成");
        Ok(indices)
    }
}
