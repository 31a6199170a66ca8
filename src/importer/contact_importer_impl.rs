// ==========================================
// 联系人导入 - 导入器实现
// ==========================================
// 职责: 整合预览生成流程，从文件字节到待审阅会话
// 流程: 解析 → 表头判定 → (无表头: 列推断) → 映射 → 规范化
// 说明: 解析之后全部是对不可变 RawGrid 的同步纯计算
// ==========================================

use crate::domain::contact::{ImportSession, RawGrid, SessionState};
use crate::domain::schema::ImportSchema;
use crate::importer::column_sampler::{ColumnSampler, DEFAULT_SAMPLE_ROWS};
use crate::importer::contact_importer_trait::{ContactImporter, TableExtractor};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_classifier::HeaderClassifier;
use crate::importer::row_normalizer::normalize_rows;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 预览阶段的产物（不含会话元信息）
#[derive(Debug, Clone)]
pub struct PreparedGrid {
    pub has_header: bool,
    pub header_labels: Vec<String>,
    pub inferred_roles: Option<Vec<crate::domain::contact::ColumnRole>>,
    pub column_indices: crate::importer::field_mapper::FieldIndices,
    pub preview: crate::domain::contact::ImportPreview,
}

/// 对已读取的 RawGrid 生成预览
///
/// # 参数
/// - grid: 读取器输出
/// - schema: 导入规则（可注入替换）
/// - sample_rows: 无表头时的抽样行数
///
/// # 返回
/// - Ok(PreparedGrid)
/// - Err: EmptyContent / NoNameColumn
pub fn build_preview(
    grid: &RawGrid,
    schema: &ImportSchema,
    sample_rows: usize,
) -> ImportResult<PreparedGrid> {
    // === 步骤 1: 表头判定 ===
    let decision = HeaderClassifier::new(schema).classify(grid)?;
    debug!(has_header = decision.has_header, "表头判定完成");

    // === 步骤 2: 无表头时推断列语义并合成表头 ===
    let (header_labels, inferred_roles) = if decision.has_header {
        (decision.header_labels, None)
    } else {
        let sampled = ColumnSampler::new(sample_rows).infer(&decision.data);
        info!(labels = ?sampled.header_labels, "无表头，已合成表头");
        (sampled.header_labels, Some(sampled.roles))
    };

    // === 步骤 3: 映射 + 规范化（两条路径在此汇合） ===
    let first_row_number = if decision.has_header { 2 } else { 1 };
    let (column_indices, preview) =
        normalize_rows(&decision.data, &header_labels, schema, first_row_number)?;

    Ok(PreparedGrid {
        has_header: decision.has_header,
        header_labels,
        inferred_roles,
        column_indices,
        preview,
    })
}

// ==========================================
// ContactImporterImpl
// ==========================================
pub struct ContactImporterImpl {
    schema: ImportSchema,
    file_parser: UniversalFileParser,
    sample_rows: usize,
}

impl ContactImporterImpl {
    /// # 参数
    /// - schema: 导入规则
    /// - extractor: 文档类文件的远程抽取服务（可选）
    pub fn new(schema: ImportSchema, extractor: Option<Arc<dyn TableExtractor>>) -> Self {
        let file_parser = UniversalFileParser::new(&schema, extractor);
        Self {
            schema,
            file_parser,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows.max(1);
        self
    }

    pub fn schema(&self) -> &ImportSchema {
        &self.schema
    }
}

#[async_trait]
impl ContactImporter for ContactImporterImpl {
    #[instrument(skip(self, bytes), fields(session_id = tracing::field::Empty, size = bytes.len()))]
    async fn prepare(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ImportSession> {
        let session_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("session_id", session_id.as_str());
        info!(file_name = %file_name, "开始生成导入预览");

        let grid = self.file_parser.parse(file_name, bytes).await?;
        info!(rows = grid.len(), "文件解析完成");

        let prepared = build_preview(&grid, &self.schema, self.sample_rows)?;

        info!(
            accepted = prepared.preview.preview.len(),
            skipped = prepared.preview.errors.len(),
            "导入预览已生成"
        );

        Ok(ImportSession {
            session_id,
            file_name: file_name.to_string(),
            created_at: Utc::now(),
            grid,
            has_header: prepared.has_header,
            header_labels: prepared.header_labels,
            column_indices: prepared.column_indices,
            inferred_roles: prepared.inferred_roles,
            preview: prepared.preview.preview,
            errors: prepared.preview.errors,
            progress: 0,
            result: None,
            state: SessionState::Previewed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::ColumnRole;
    use crate::importer::error::ImportError;

    #[test]
    fn test_headerless_scenario() {
        let grid = RawGrid::from_strs(&[
            &["Maria Souza", "maria@x.com"],
            &["Ana Lima", "ana@x.com"],
        ]);
        let prepared = build_preview(&grid, &ImportSchema::default(), 5).unwrap();

        assert!(!prepared.has_header);
        assert_eq!(
            prepared.inferred_roles,
            Some(vec![ColumnRole::Name, ColumnRole::Email])
        );
        assert_eq!(prepared.preview.preview.len(), 2);
        assert!(prepared.preview.errors.is_empty());
        assert_eq!(prepared.preview.preview[0].row_number, 1);
        assert_eq!(
            prepared.preview.preview[1].email.as_deref(),
            Some("ana@x.com")
        );
    }

    #[test]
    fn test_headered_row_numbers_start_at_two() {
        let grid = RawGrid::from_strs(&[&["Nome"], &["Ana"], &[""]]);
        let prepared = build_preview(&grid, &ImportSchema::default(), 5).unwrap();
        assert_eq!(prepared.preview.preview[0].row_number, 2);
        assert_eq!(prepared.preview.errors[0].row_number, 3);
    }

    #[test]
    fn test_header_without_name_column() {
        let grid = RawGrid::from_strs(&[&["Email", "Telefone"], &["a@x.com", "11999990000"]]);
        let result = build_preview(&grid, &ImportSchema::default(), 5);
        assert!(matches!(result, Err(ImportError::NoNameColumn { .. })));
    }

    #[test]
    fn test_headerless_notes_column_keeps_first_row() {
        let grid = RawGrid::from_strs(&[
            &["Ana Lima", "ana@x.com", "cliente antigo"],
            &["Bia Souza", "bia@x.com", "ligar segunda"],
            &["Caio Prado", "caio@x.com", "sem retorno"],
        ]);
        let prepared = build_preview(&grid, &ImportSchema::default(), 5).unwrap();

        assert!(!prepared.has_header);
        let names: Vec<&str> = prepared
            .preview
            .preview
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ana Lima", "Bia Souza", "Caio Prado"]);
        assert_eq!(prepared.preview.preview[0].row_number, 1);
    }

    #[test]
    fn test_headerless_name_with_keyword_prefix() {
        let grid = RawGrid::from_strs(&[&["Mailson Pereira", "m@x.com"], &["Ana Lima", "a@x.com"]]);
        let prepared = build_preview(&grid, &ImportSchema::default(), 5).unwrap();

        assert!(!prepared.has_header);
        assert_eq!(prepared.preview.preview.len(), 2);
        assert_eq!(prepared.preview.preview[0].name, "Mailson Pereira");
    }

    #[test]
    fn test_age_alias_matches_city_header_first() {
        // "cidade" 含子串 "idade"，年龄取到城市列，真正的 "idade" 列被忽略
        let grid = RawGrid::from_strs(&[&["Nome", "Cidade", "Idade"], &["Ana", "Campinas", "30"]]);
        let prepared = build_preview(&grid, &ImportSchema::default(), 5).unwrap();

        let ana = &prepared.preview.preview[0];
        assert_eq!(ana.city.as_deref(), Some("Campinas"));
        assert_eq!(ana.age, None);
    }

    #[tokio::test]
    async fn test_prepare_csv_session() {
        let importer = ContactImporterImpl::new(ImportSchema::default(), None);
        let csv = "Nome;Email;Idade\njoão silva;joao@x.com;33\n;vazio@x.com;20\n";
        let session = importer.prepare("contatos.csv", csv.as_bytes()).await.unwrap();

        assert!(session.has_header);
        assert_eq!(session.state, SessionState::Previewed);
        assert_eq!(session.preview.len(), 1);
        assert_eq!(session.preview[0].age, Some(33));
        assert_eq!(session.errors.len(), 1);
        assert_eq!(session.data_row_count(), 2);
        assert_eq!(session.progress, 0);
        assert!(session.result.is_none());
    }

    #[tokio::test]
    async fn test_prepare_rejects_unknown_extension() {
        let importer = ContactImporterImpl::new(ImportSchema::default(), None);
        let result = importer.prepare("contatos.json", b"[]").await;
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
