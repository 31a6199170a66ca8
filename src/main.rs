// ==========================================
// 联系人导入 - 命令行入口
// ==========================================
// 用法:
//   contact-import <file> [db_path] [--yes] [--report <csv>]
//
// 不带 --yes 时只输出预览（相当于操作员取消）；
// 带 --yes 时提交预览并输出汇总。
// ==========================================

use contact_import::config::{ConfigManager, ImportConfigReader};
use contact_import::db::{default_db_path, open_sqlite_connection};
use contact_import::domain::{ImportProgress, ImportSession};
use contact_import::i18n::{self, t, t_with_args};
use contact_import::importer::contact_importer_trait::{ContactImporter, TableExtractor};
use contact_import::importer::reject_report::write_report_file;
use contact_import::importer::{
    ContactImporterImpl, ExecutorConfig, HttpTableExtractor, ImportExecutor,
};
use contact_import::repository::SqliteContactRepository;
use contact_import::logging;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// 预览中最多打印的记录数
const PREVIEW_PRINT_LIMIT: usize = 10;

#[derive(Debug, Default)]
struct CliArgs {
    file: PathBuf,
    db_path: Option<String>,
    confirm: bool,
    report: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--yes" | "-y" => parsed.confirm = true,
            "--report" => {
                let path = args.next().ok_or_else(|| t("cli.usage"))?;
                parsed.report = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => return Err(t("cli.usage")),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    parsed.file = PathBuf::from(positional.next().ok_or_else(|| t("cli.usage"))?);
    parsed.db_path = positional.next();
    Ok(parsed)
}

fn print_preview(session: &ImportSession) {
    println!(
        "{}",
        t_with_args(
            "import.preview_header",
            &[
                ("file", &session.file_name),
                ("accepted", &session.preview.len().to_string()),
                ("skipped", &session.errors.len().to_string()),
            ],
        )
    );

    for record in session.preview.iter().take(PREVIEW_PRINT_LIMIT) {
        println!(
            "{}",
            t_with_args(
                "import.preview_row",
                &[
                    ("row", &record.row_number.to_string()),
                    ("name", &record.name),
                    ("email", record.email.as_deref().unwrap_or("-")),
                    ("phone", record.phone.as_deref().unwrap_or("-")),
                ],
            )
        );
    }
    if session.preview.len() > PREVIEW_PRINT_LIMIT {
        let rest = (session.preview.len() - PREVIEW_PRINT_LIMIT).to_string();
        println!("{}", t_with_args("import.preview_more", &[("count", &rest)]));
    }

    for message in session.preview_view().error_messages() {
        println!(
            "{}",
            t_with_args("import.skipped_row", &[("message", &message)])
        );
    }
}

fn write_report(path: &Path, session: &ImportSession) -> Result<(), Box<dyn Error>> {
    let failed = session
        .result
        .as_ref()
        .map(|r| r.failed.as_slice())
        .unwrap_or(&[]);
    let count = write_report_file(path, &session.errors, failed)?;
    println!(
        "{}",
        t_with_args(
            "import.report_written",
            &[("path", &path.display().to_string()), ("count", &count.to_string())],
        )
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    i18n::init_from_env();

    let args = match parse_args() {
        Ok(args) => args,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(2);
        }
    };

    tracing::info!("==================================================");
    tracing::info!("{} v{}", contact_import::APP_NAME, contact_import::VERSION);
    tracing::info!("==================================================");

    // === 配置与存储 ===
    let db_path = args.db_path.clone().unwrap_or_else(default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));

    let config = ConfigManager::from_connection(conn.clone())?;
    tracing::debug!(snapshot = %config.get_config_snapshot()?, "配置快照");

    let schema = config.get_effective_schema().await?;
    let sample_rows = config.get_sample_rows().await?;
    let concurrency = config.get_executor_concurrency().await?;
    let extractor: Option<Arc<dyn TableExtractor>> = config
        .get_extractor_url()
        .await?
        .map(|url| Arc::new(HttpTableExtractor::new(url)) as Arc<dyn TableExtractor>);

    // === 预览 ===
    let bytes = match std::fs::read(&args.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!(
                "{}",
                t_with_args("import.file_not_found", &[("path", &args.file.display().to_string())])
            );
            return Err(e.into());
        }
    };
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let importer = ContactImporterImpl::new(schema, extractor).with_sample_rows(sample_rows);
    let mut session = importer.prepare(&file_name, &bytes).await?;
    print_preview(&session);

    if !args.confirm {
        println!("{}", t("import.confirm_hint"));
        if let Some(path) = &args.report {
            write_report(path, &session)?;
        }
        session.cancel()?;
        println!("{}", t("common.cancelled"));
        return Ok(());
    }

    // === 执行 ===
    let repo = Arc::new(SqliteContactRepository::from_connection(conn.clone())?);
    let executor = ImportExecutor::new(repo, ExecutorConfig::with_concurrency(concurrency));

    let (tx, mut rx) = mpsc::unbounded_channel::<ImportProgress>();
    let printer = tokio::spawn(async move {
        let mut last_percent: Option<u8> = None;
        while let Some(p) = rx.recv().await {
            if last_percent != Some(p.percent) {
                last_percent = Some(p.percent);
                eprintln!(
                    "{}",
                    t_with_args(
                        "import.progress",
                        &[
                            ("percent", &p.percent.to_string()),
                            ("processed", &p.processed.to_string()),
                            ("total", &p.total.to_string()),
                        ],
                    )
                );
            }
        }
    });

    let outcome = executor.run_session(&mut session, Some(&tx)).await?;
    drop(tx);
    let _ = printer.await;

    println!(
        "{}",
        t_with_args(
            "import.summary",
            &[
                ("success", &outcome.success.to_string()),
                ("errors", &outcome.errors.to_string()),
            ],
        )
    );

    if let Some(path) = &args.report {
        write_report(path, &session)?;
    }

    Ok(())
}
