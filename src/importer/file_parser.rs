// ==========================================
// 联系人导入 - 文件解析器实现
// ==========================================
// 职责: 按扩展名分派，把文件字节解码为 RawGrid
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / 文档类（远程抽取）
// 红线: 要么返回完整 RawGrid，要么返回终止错误，不返回截断结果
// ==========================================

use crate::domain::contact::RawGrid;
use crate::domain::schema::ImportSchema;
use crate::importer::contact_importer_trait::{ExtractionResponse, FileParser, TableExtractor};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Reader};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

// ==========================================
// CSV Parser 实现
// ==========================================
// 逐行切分；引号外的 ',' 与 ';' 均视为分隔符，"" 表示引号本身
pub struct CsvParser;

impl CsvParser {
    /// 解码文本：优先 UTF-8（去 BOM），失败时回退 Windows-1252
    pub fn decode_text(bytes: &[u8]) -> String {
        let (text, _, had_errors) = UTF_8.decode(bytes);
        if !had_errors {
            return text.into_owned();
        }
        warn!("CSV 不是合法 UTF-8，按 Windows-1252 解码");
        let (text, _, _) = WINDOWS_1252.decode(bytes);
        text.into_owned()
    }

    /// 切分单行
    pub fn split_line(line: &str) -> Vec<String> {
        let mut cells = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' | ';' if !in_quotes => {
                    cells.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            }
        }
        cells.push(current.trim().to_string());

        cells
    }
}

impl FileParser for CsvParser {
    fn parse_to_grid(&self, bytes: &[u8]) -> ImportResult<RawGrid> {
        let text = Self::decode_text(bytes);

        // \r\n 会切出空片段，与空白行一起跳过
        let rows: Vec<Vec<String>> = text
            .split(|c: char| c == '\n' || c == '\r')
            .filter(|line| !line.trim().is_empty())
            .map(Self::split_line)
            .collect();

        debug!(rows = rows.len(), "CSV 解析完成");
        Ok(RawGrid::new(rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读取第一个工作表
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_grid(&self, bytes: &[u8]) -> ImportResult<RawGrid> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = Vec::new();
        for data_row in range.rows() {
            let row: Vec<String> = data_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();

            // 跳过完全空白的行
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        debug!(sheet = %sheet_name, rows = rows.len(), "Excel 解析完成");
        Ok(RawGrid::new(rows))
    }
}

// ==========================================
// 文档解析器（委托远程抽取服务）
// ==========================================
pub struct DocumentParser {
    extractor: Arc<dyn TableExtractor>,
}

impl DocumentParser {
    pub fn new(extractor: Arc<dyn TableExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn parse_to_grid(&self, file_name: &str, bytes: &[u8]) -> ImportResult<RawGrid> {
        let response = self
            .extractor
            .extract(file_name, bytes)
            .await
            .map_err(|e| ImportError::UnsupportedContent(e.to_string()))?;

        match response {
            ExtractionResponse::Error(message) => Err(ImportError::UnsupportedContent(message)),
            ExtractionResponse::Data(rows) if rows.len() < 2 => Err(
                ImportError::UnsupportedContent(format!("抽取结果仅 {} 行", rows.len())),
            ),
            ExtractionResponse::Data(rows) => Ok(RawGrid::new(rows)),
        }
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser {
    schema: ImportSchema,
    document_parser: Option<DocumentParser>,
}

impl UniversalFileParser {
    /// # 参数
    /// - schema: 提供文档类扩展名列表
    /// - extractor: 远程抽取服务；为 None 时文档类文件一律 UnsupportedContent
    pub fn new(schema: &ImportSchema, extractor: Option<Arc<dyn TableExtractor>>) -> Self {
        Self {
            schema: schema.clone(),
            document_parser: extractor.map(DocumentParser::new),
        }
    }

    /// 文件扩展名（小写，不含点）
    pub fn extension_of(file_name: &str) -> String {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => String::new(),
        }
    }

    pub async fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<RawGrid> {
        let ext = Self::extension_of(file_name);

        match ext.as_str() {
            "csv" => CsvParser.parse_to_grid(bytes),
            "xlsx" | "xls" => ExcelParser.parse_to_grid(bytes),
            other if self.schema.is_document_extension(other) => {
                match &self.document_parser {
                    Some(parser) => parser.parse_to_grid(file_name, bytes).await,
                    None => Err(ImportError::UnsupportedContent(format!(
                        "未配置表格抽取服务，无法处理 .{} 文件",
                        other
                    ))),
                }
            }
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedExtractor(ExtractionResponse);

    #[async_trait]
    impl TableExtractor for FixedExtractor {
        async fn extract(&self, _: &str, _: &[u8]) -> ImportResult<ExtractionResponse> {
            Ok(self.0.clone())
        }
    }

    fn parser_with(response: Option<ExtractionResponse>) -> UniversalFileParser {
        let extractor: Option<Arc<dyn TableExtractor>> = response
            .map(|r| Arc::new(FixedExtractor(r)) as Arc<dyn TableExtractor>);
        UniversalFileParser::new(&ImportSchema::default(), extractor)
    }

    #[test]
    fn test_split_line_mixed_delimiters() {
        assert_eq!(CsvParser::split_line("a,b;c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_line_quoted_delimiters() {
        let cells = CsvParser::split_line(r#""Silva, João";"Rua A; 10",x"#);
        assert_eq!(cells, vec!["Silva, João", "Rua A; 10", "x"]);
    }

    #[test]
    fn test_split_line_embedded_quotes() {
        let cells = CsvParser::split_line(r#""diz ""oi""",b"#);
        assert_eq!(cells, vec![r#"diz "oi""#, "b"]);
    }

    #[test]
    fn test_split_line_trailing_empty_cell() {
        assert_eq!(CsvParser::split_line("a,"), vec!["a", ""]);
    }

    #[test]
    fn test_csv_parser_crlf_and_blank_lines() {
        let bytes = b"Nome,Email\r\nAna,ana@x.com\r\n\r\n   \r\nBia,bia@x.com\r\n";
        let grid = CsvParser.parse_to_grid(bytes).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell(2, 0), "Bia");
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Nome\nJoão".as_bytes());
        let grid = CsvParser.parse_to_grid(&bytes).unwrap();
        assert_eq!(grid.cell(0, 0), "Nome");
        assert_eq!(grid.cell(1, 0), "João");
    }

    #[test]
    fn test_csv_parser_windows_1252_fallback() {
        // "João" 的 Latin-1 编码
        let bytes = b"Nome\nJo\xe3o";
        let grid = CsvParser.parse_to_grid(bytes).unwrap();
        assert_eq!(grid.cell(1, 0), "João");
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.parse_to_grid(b"definitely not a workbook");
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(UniversalFileParser::extension_of("Contatos.CSV"), "csv");
        assert_eq!(UniversalFileParser::extension_of("a.b.xlsx"), "xlsx");
        assert_eq!(UniversalFileParser::extension_of("semextensao"), "");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_unsupported_format() {
        let parser = parser_with(None);
        let result = parser.parse("dados.zip", b"PK").await;
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "zip"));
    }

    #[tokio::test]
    async fn test_document_extraction_success() {
        let rows = vec![
            vec!["Nome".to_string(), "Email".to_string()],
            vec!["Ana".to_string(), "ana@x.com".to_string()],
        ];
        let parser = parser_with(Some(ExtractionResponse::Data(rows)));
        let grid = parser.parse("scan.pdf", b"%PDF").await.unwrap();
        assert_eq!(grid.len(), 2);
    }

    #[tokio::test]
    async fn test_document_extraction_too_few_rows() {
        let rows = vec![vec!["Nome".to_string()]];
        let parser = parser_with(Some(ExtractionResponse::Data(rows)));
        let result = parser.parse("scan.pdf", b"%PDF").await;
        assert!(matches!(result, Err(ImportError::UnsupportedContent(_))));
    }

    #[tokio::test]
    async fn test_document_extraction_error() {
        let parser = parser_with(Some(ExtractionResponse::Error("ocr failed".into())));
        let result = parser.parse("scan.png", b"").await;
        assert!(matches!(result, Err(ImportError::UnsupportedContent(m)) if m == "ocr failed"));
    }

    #[tokio::test]
    async fn test_document_without_extractor() {
        let parser = parser_with(None);
        let result = parser.parse("scan.pdf", b"%PDF").await;
        assert!(matches!(result, Err(ImportError::UnsupportedContent(_))));
    }
}
