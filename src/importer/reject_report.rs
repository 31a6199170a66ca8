// ==========================================
// 联系人导入 - 拒绝报告
// ==========================================
// 职责: 将跳过的行与提交失败的记录写出为 CSV，供人工修正后重新导入
// 列: stage, row_number, name, reason
// ==========================================

use crate::domain::contact::{FailedSubmission, RowError};
use crate::importer::error::{ImportError, ImportResult};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 报告中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectEntry {
    /// preview: 预览阶段跳过；submit: 提交阶段失败
    pub stage: &'static str,
    pub row_number: usize,
    pub name: String,
    pub reason: String,
}

/// 合并预览错误与提交失败，按来源行号排序
pub fn collect_entries(row_errors: &[RowError], failed: &[FailedSubmission]) -> Vec<RejectEntry> {
    let mut entries: Vec<RejectEntry> = row_errors
        .iter()
        .map(|e| RejectEntry {
            stage: "preview",
            row_number: e.row_number,
            name: String::new(),
            reason: e.reason.clone(),
        })
        .chain(failed.iter().map(|f| RejectEntry {
            stage: "submit",
            row_number: f.row_number,
            name: f.name.clone(),
            reason: f.reason.clone(),
        }))
        .collect();

    entries.sort_by_key(|e| e.row_number);
    entries
}

/// 写入任意 Writer
pub fn write_report<W: Write>(
    writer: W,
    row_errors: &[RowError],
    failed: &[FailedSubmission],
) -> ImportResult<usize> {
    let entries = collect_entries(row_errors, failed);
    let mut wtr = csv::Writer::from_writer(writer);

    for entry in &entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()
        .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;

    Ok(entries.len())
}

/// 写入文件
pub fn write_report_file<P: AsRef<Path>>(
    path: P,
    row_errors: &[RowError],
    failed: &[FailedSubmission],
) -> ImportResult<usize> {
    let file = std::fs::File::create(path.as_ref())
        .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;
    let written = write_report(file, row_errors, failed)?;

    info!(path = %path.as_ref().display(), entries = written, "拒绝报告已写出");
    Ok(written)
}
