// ==========================================
// 联系人导入 - 远程表格抽取客户端
// ==========================================
// 职责: 把文档类文件交给外部抽取服务，解析 {data} / {error} 响应
// 契约: 请求体为 multipart 字段 file；响应 {"data": [[...]]} 或 {"error": "..."}
// ==========================================

use crate::importer::contact_importer_trait::{ExtractionResponse, TableExtractor};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// 默认请求超时（秒）
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct RawExtractionBody {
    #[serde(default)]
    data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    error: Option<String>,
}

/// 单元格统一转字符串；null → ""
fn cell_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// 解析抽取服务响应体
///
/// # 返回
/// - Ok(Data): 含 data 字段
/// - Ok(Error): 含 error 字段，或两者皆无
/// - Err: 响应体不是合法 JSON
pub fn parse_extraction_body(body: &str) -> ImportResult<ExtractionResponse> {
    let raw: RawExtractionBody = serde_json::from_str(body)
        .map_err(|e| ImportError::UnsupportedContent(format!("抽取服务响应无法解析: {}", e)))?;

    if let Some(message) = raw.error {
        return Ok(ExtractionResponse::Error(message));
    }

    match raw.data {
        Some(rows) => Ok(ExtractionResponse::Data(
            rows.into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect(),
        )),
        None => Ok(ExtractionResponse::Error(
            "抽取服务响应缺少 data 字段".to_string(),
        )),
    }
}

// ==========================================
// HttpTableExtractor
// ==========================================
pub struct HttpTableExtractor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTableExtractor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DEFAULT_EXTRACTION_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TableExtractor for HttpTableExtractor {
    #[instrument(skip(self, bytes), fields(endpoint = %self.endpoint, size = bytes.len()))]
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ExtractionResponse> {
        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "抽取服务已响应");

        // 非 2xx 也可能携带 {error}，先尝试按契约解析
        match parse_extraction_body(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) if !status.is_success() => {
                warn!(status = %status, "抽取服务返回错误状态");
                Err(ImportError::ExtractionTransportError(format!(
                    "HTTP {}: {}",
                    status, e
                )))
            }
            Err(e) => Err(e),
        }
    }
}
