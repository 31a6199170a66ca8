// ==========================================
// SQLite 联系人存储端到端测试
// ==========================================
// 测试目标: 文件 → 预览 → 执行 → contacts 表 → 拒绝报告
// ==========================================

mod test_helpers;

use contact_import::domain::{Gender, ImportSchema};
use contact_import::importer::contact_importer_trait::ContactImporter;
use contact_import::importer::reject_report::write_report_file;
use contact_import::importer::{ContactImporterImpl, ExecutorConfig, ImportExecutor};
use contact_import::repository::{ContactRepository, SqliteContactRepository};
use std::sync::Arc;

#[tokio::test]
async fn test_xlsx_import_into_sqlite() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let repo = Arc::new(SqliteContactRepository::new(&db_path).unwrap());

    let importer = ContactImporterImpl::new(ImportSchema::default(), None);
    let bytes = test_helpers::read_fixture("contatos.xlsx");
    let mut session = importer.prepare("contatos.xlsx", &bytes).await.unwrap();

    let executor = ImportExecutor::new(repo.clone(), ExecutorConfig::default());
    let outcome = executor.run_session(&mut session, None).await.unwrap();
    assert_eq!(outcome.success, 2);
    assert_eq!(outcome.errors, 0);

    assert_eq!(repo.count_contacts().await.unwrap(), 2);
    let stored = repo.list_contacts().unwrap();
    assert_eq!(stored[0].name, "João Da Silva");
    assert_eq!(stored[0].gender, Some(Gender::Masculine));
    assert_eq!(stored[0].interests, vec!["Música", "Esportes"]);
    assert_eq!(stored[0].source, "Importação");
    assert_eq!(stored[1].email.as_deref(), Some("maria@exemplo.com"));
    assert_ne!(stored[0].contact_id, stored[1].contact_id);
}

#[tokio::test]
async fn test_reopen_database_keeps_contacts() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();

    {
        let repo = SqliteContactRepository::new(&db_path).unwrap();
        let candidates = test_helpers::make_candidates(3);
        for c in &candidates {
            repo.insert_contact(c).await.unwrap();
        }
    }

    let repo = SqliteContactRepository::new(&db_path).unwrap();
    assert_eq!(repo.count_contacts().await.unwrap(), 3);
}

#[tokio::test]
async fn test_reject_report_after_partial_failure() {
    let importer = ContactImporterImpl::new(ImportSchema::default(), None);
    let csv = "Nome;Email\nAna;ana@x.com\n;vazio@x.com\nBia;bia@x.com\n";
    let mut session = importer.prepare("contatos.csv", csv.as_bytes()).await.unwrap();

    let repo = Arc::new(test_helpers::FlakyRepository::new(&["Bia"]));
    let executor = ImportExecutor::new(repo, ExecutorConfig::default());
    let outcome = executor.run_session(&mut session, None).await.unwrap();
    assert_eq!((outcome.success, outcome.errors), (1, 1));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rejeitados.csv");
    let written = write_report_file(&path, &session.errors, &outcome.failed).unwrap();
    assert_eq!(written, 2);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(&records[0][0], "preview");
    assert_eq!(&records[0][1], "3");
    assert_eq!(&records[1][0], "submit");
    assert_eq!(&records[1][1], "4");
    assert_eq!(&records[1][2], "Bia");
}
