// ==========================================
// 联系人导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 此处只包含致命错误；行级跳过与提交失败不走 Err 通道
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 致命: 行处理开始前终止 =====
    #[error("文件格式不支持: {0}（支持 .xlsx/.xls/.csv 及文档类格式）")]
    UnsupportedFormat(String),

    #[error("没有可导入的数据行")]
    EmptyContent,

    #[error("文档内容无法识别为表格: {0}")]
    UnsupportedContent(String),

    #[error("无法识别姓名列（表头: {headers:?}）")]
    NoNameColumn { headers: Vec<String> },

    // ===== 读取相关 =====
    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("表格抽取服务调用失败: {0}")]
    ExtractionTransportError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 会话 / 输出 =====
    #[error("导入会话已执行或已取消: {0}")]
    SessionAlreadyExecuted(String),

    #[error("拒绝报告写入失败: {0}")]
    ReportWriteError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ReportWriteError(err.to_string())
    }
}

impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        ImportError::ExtractionTransportError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
