// Serial worker tests: commands in, notices out, nothing awaited inline
use alexandria_core::{
    worker, BookMetadata, BookStore, Catalog, Command, MetadataProvider, Notice,
};
use tokio::sync::mpsc::UnboundedReceiver;

mockall::mock! {
    pub Provider {}

    #[async_trait::async_trait]
    impl MetadataProvider for Provider {
        async fn lookup(&self, isbn: &str) -> alexandria_core::Result<Option<BookMetadata>>;
    }
}

fn sample_metadata() -> BookMetadata {
    BookMetadata {
        title: "Pride and Prejudice".to_string(),
        authors: vec!["Jane Austen".to_string()],
        ..BookMetadata::default()
    }
}

fn spawn_worker(provider: MockProvider) -> worker::CatalogHandle {
    let store = BookStore::open_in_memory().unwrap();
    worker::spawn(Catalog::new(Box::new(provider), store))
}

async fn drain(mut notices: UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut collected = Vec::new();
    while let Some(notice) = notices.recv().await {
        collected.push(notice);
    }
    collected
}

#[tokio::test]
async fn test_commands_run_in_order_and_normalize_isbn10() {
    let mut provider = MockProvider::new();
    // 10-digit input gets the 978 prefix before reaching the provider
    provider
        .expect_lookup()
        .withf(|isbn| isbn == "9780141439513")
        .times(1)
        .returning(|_| Ok(Some(sample_metadata())));

    let worker::CatalogHandle { commands, notices } = spawn_worker(provider);

    commands
        .send(Command::Fetch {
            isbn: "0141439513".to_string(),
        })
        .await
        .unwrap();
    commands
        .send(Command::Confirm {
            isbn: "0141439513".to_string(),
        })
        .await
        .unwrap();
    commands.send(Command::Sweep).await.unwrap();
    drop(commands);

    let notices = drain(notices).await;
    assert_eq!(notices.len(), 3);
    assert!(matches!(notices[0], Notice::Fetched(ref r) if r.isbn == "9780141439513"));
    assert_eq!(notices[1], Notice::Saved);
    assert_eq!(notices[2], Notice::Swept(0));
}

#[tokio::test]
async fn test_invalid_fetch_is_dropped_silently() {
    let mut provider = MockProvider::new();
    provider.expect_lookup().times(0);

    let worker::CatalogHandle { commands, notices } = spawn_worker(provider);

    commands
        .send(Command::Fetch {
            isbn: "not-an-isbn".to_string(),
        })
        .await
        .unwrap();
    commands.send(Command::Sweep).await.unwrap();
    drop(commands);

    let notices = drain(notices).await;
    assert_eq!(notices, vec![Notice::Swept(0)]);
}

#[tokio::test]
async fn test_silent_noops_emit_no_notice() {
    let provider = MockProvider::new();
    let worker::CatalogHandle { commands, notices } = spawn_worker(provider);

    commands
        .send(Command::Confirm {
            isbn: "9780141439518".to_string(),
        })
        .await
        .unwrap();
    commands
        .send(Command::Delete {
            isbn: "9780141439518".to_string(),
        })
        .await
        .unwrap();
    drop(commands);

    let notices = drain(notices).await;
    assert!(notices.is_empty());
}

#[tokio::test]
async fn test_dropping_sender_closes_notice_stream() {
    let provider = MockProvider::new();
    let worker::CatalogHandle {
        commands,
        mut notices,
    } = spawn_worker(provider);

    drop(commands);
    assert_eq!(notices.recv().await, None);
}
