//! On-disk behaviour of the SQLite store.

#![cfg(feature = "sqlite")]

use notices::{Notice, NoticeStore, SqliteNoticeStore};
use tempfile::TempDir;

fn notice(title: &str, date: &str) -> Notice {
    Notice::new(title, date).with_download_link("https://sweedu.in/a.pdf")
}

#[tokio::test]
async fn creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/deeper/notices.db");

    let store = SqliteNoticeStore::open(&path).await.unwrap();
    assert_eq!(store.save(&[notice("A", "1")]).await.unwrap(), 1);
    store.close().await;

    assert!(path.exists());
}

#[tokio::test]
async fn rows_survive_reopen_and_stay_unique() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notices.db");

    let store = SqliteNoticeStore::open(&path).await.unwrap();
    let inserted = store
        .save(&[notice("A", "1"), notice("B", "2")])
        .await
        .unwrap();
    assert_eq!(inserted, 2);
    store.close().await;

    let reopened = SqliteNoticeStore::open(&path).await.unwrap();
    let inserted = reopened
        .save(&[notice("A", "1"), notice("C", "3")])
        .await
        .unwrap();
    assert_eq!(inserted, 1);

    let titles: Vec<String> = reopened
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn first_write_wins() {
    let dir = TempDir::new().unwrap();
    let store = SqliteNoticeStore::open(dir.path().join("notices.db"))
        .await
        .unwrap();

    store
        .save(&[notice("A", "1").with_description("original")])
        .await
        .unwrap();
    store
        .save(&[notice("A", "1").with_description("edited")])
        .await
        .unwrap();

    let stored = store.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "original");
}
