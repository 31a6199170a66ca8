// ==========================================
// 导入执行器集成测试
// ==========================================
// 测试目标: 部分失败隔离、进度单调、会话只执行一次
// ==========================================

mod test_helpers;

use contact_import::domain::{ImportProgress, ImportSchema, SessionState};
use contact_import::importer::contact_importer_trait::ContactImporter;
use contact_import::importer::{ContactImporterImpl, ExecutorConfig, ImportError, ImportExecutor};
use contact_import::logging;
use std::sync::Arc;
use test_helpers::FlakyRepository;
use tokio::sync::mpsc;

async fn collect_progress(mut rx: mpsc::UnboundedReceiver<ImportProgress>) -> Vec<ImportProgress> {
    let mut events = Vec::new();
    while let Some(p) = rx.recv().await {
        events.push(p);
    }
    events
}

#[tokio::test]
async fn test_500_candidates_one_failure() {
    logging::init_test();

    let repo = Arc::new(FlakyRepository::new(&["Contato 250"]));
    let executor = ImportExecutor::new(repo.clone(), ExecutorConfig::default());
    let candidates = test_helpers::make_candidates(500);

    let (tx, rx) = mpsc::unbounded_channel();
    let outcome = executor.execute(&candidates, Some(&tx)).await;
    drop(tx);

    assert_eq!(outcome.success, 499);
    assert_eq!(outcome.errors, 1);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].name, "Contato 250");

    // 失败之后的记录仍被提交
    let accepted = repo.accepted();
    assert_eq!(accepted.len(), 499);
    assert_eq!(accepted.last().map(String::as_str), Some("Contato 500"));

    let events = collect_progress(rx).await;
    assert_eq!(events.len(), 500);
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    let last = events.last().unwrap();
    assert_eq!(last.percent, 100);
    assert_eq!((last.success, last.errors), (499, 1));
}

#[tokio::test]
async fn test_all_submissions_fail() {
    let names: Vec<String> = (1..=5).map(|i| format!("Contato {}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let repo = Arc::new(FlakyRepository::new(&name_refs));
    let executor = ImportExecutor::new(repo, ExecutorConfig::default());

    let outcome = executor.execute(&test_helpers::make_candidates(5), None).await;
    assert_eq!(outcome.success, 0);
    assert_eq!(outcome.errors, 5);
}

#[tokio::test]
async fn test_bounded_concurrency_same_tally() {
    let repo = Arc::new(FlakyRepository::new(&["Contato 10", "Contato 90"]));
    let executor = ImportExecutor::new(repo, ExecutorConfig::with_concurrency(8));

    let (tx, rx) = mpsc::unbounded_channel();
    let outcome = executor
        .execute(&test_helpers::make_candidates(100), Some(&tx))
        .await;
    drop(tx);

    assert_eq!(outcome.success, 98);
    assert_eq!(outcome.errors, 2);
    assert_eq!(outcome.failed[0].name, "Contato 10");
    assert_eq!(outcome.failed[1].name, "Contato 90");

    let events = collect_progress(rx).await;
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert_eq!(events.last().map(|p| p.percent), Some(100));
}

#[tokio::test]
async fn test_session_consumed_exactly_once() {
    let importer = ContactImporterImpl::new(ImportSchema::default(), None);
    let csv = "Nome;Email\nAna;ana@x.com\nBia;bia@x.com\n;sem@x.com\n";
    let mut session = importer.prepare("contatos.csv", csv.as_bytes()).await.unwrap();

    let repo = Arc::new(FlakyRepository::new(&[]));
    let executor = ImportExecutor::new(repo.clone(), ExecutorConfig::default());

    let outcome = executor.run_session(&mut session, None).await.unwrap();
    assert_eq!(outcome.success, 2);
    assert_eq!(session.state, SessionState::Executed);
    assert_eq!(session.progress, 100);
    assert_eq!(session.result.as_ref(), Some(&outcome));
    // 预览阶段跳过的行不进入执行器
    assert_eq!(session.errors.len(), 1);

    let second = executor.run_session(&mut session, None).await;
    assert!(matches!(second, Err(ImportError::SessionAlreadyExecuted(_))));
    assert_eq!(repo.accepted().len(), 2);
}

#[tokio::test]
async fn test_cancelled_session_cannot_execute() {
    let importer = ContactImporterImpl::new(ImportSchema::default(), None);
    let mut session = importer
        .prepare("contatos.csv", "Nome\nAna\n".as_bytes())
        .await
        .unwrap();

    session.cancel().unwrap();
    assert_eq!(session.state, SessionState::Cancelled);
    assert!(session.preview.is_empty());

    let repo = Arc::new(FlakyRepository::new(&[]));
    let executor = ImportExecutor::new(repo.clone(), ExecutorConfig::default());
    let result = executor.run_session(&mut session, None).await;
    assert!(matches!(result, Err(ImportError::SessionAlreadyExecuted(_))));
    assert!(repo.accepted().is_empty());

    assert!(session.cancel().is_err());
}
