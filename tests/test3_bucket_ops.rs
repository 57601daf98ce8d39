use mockall::Sequence;
use objstore_csv_mgr::domain::{DeleteBatch, ListPage};
use objstore_csv_mgr::errors::StorageError;
use objstore_csv_mgr::infra::memory_adapter::InMemoryStore;
use objstore_csv_mgr::objects::bucket::MAX_DELETE_BATCH;
use objstore_csv_mgr::objects::{clear_bucket, delete_file, list_buckets, list_files, list_folders};
use objstore_csv_mgr::ports::MockObjectStore;
use objstore_csv_mgr::utils::log_utils::Logger;
use std::collections::HashSet;

const BUCKET: &str = "words";

fn populated_store(count: usize, page_size: usize) -> InMemoryStore {
    let store = InMemoryStore::new("https://example.invalid").with_page_size(page_size);
    store.create_bucket(BUCKET);
    for i in 0..count {
        store.insert(BUCKET, &format!("dir{}/file{i:05}.txt", i % 3), b"x");
    }
    store
}

#[test]
fn list_files_returns_every_key_for_any_page_size() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::new(0);
    for page_size in [1, 7, 100, 1000, 5000] {
        let store = populated_store(2_345, page_size);

        let files = list_files(&store, BUCKET, &logger)?;

        let unique: HashSet<_> = files.iter().collect();
        assert_eq!(files.len(), 2_345, "page size {page_size}");
        assert_eq!(unique.len(), 2_345, "page size {page_size}");
    }
    Ok(())
}

#[test]
fn list_files_on_empty_bucket_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let store = InMemoryStore::new("https://example.invalid");
    store.create_bucket(BUCKET);
    assert!(list_files(&store, BUCKET, &Logger::new(0))?.is_empty());
    Ok(())
}

#[test]
fn clear_then_list_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::new(0);
    let store = populated_store(1_234, 100);

    let report = clear_bucket(&store, BUCKET, &logger)?;

    assert_eq!(report.deleted, 1_234);
    assert!(report.failed.is_empty());
    assert!(list_files(&store, BUCKET, &logger)?.is_empty());
    Ok(())
}

#[test]
fn clear_reports_keys_the_service_refused() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::new(0);
    let store = populated_store(10, 4);
    store.protect(BUCKET, "dir0/file00000.txt");

    let report = clear_bucket(&store, BUCKET, &logger)?;

    assert_eq!(report.deleted, 9);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "dir0/file00000.txt");
    assert_eq!(list_files(&store, BUCKET, &logger)?, vec!["dir0/file00000.txt"]);
    Ok(())
}

#[test]
fn clear_sends_one_bulk_delete_per_page() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = MockObjectStore::new();
    let mut seq = Sequence::new();

    store
        .expect_list_objects_page()
        .withf(|req| req.bucket == BUCKET && req.continuation_token.is_none())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(ListPage {
                keys: vec!["a".into(), "b".into()],
                common_prefixes: vec![],
                next_token: Some("b".into()),
            })
        });
    store
        .expect_delete_objects()
        .withf(|bucket, keys| bucket == BUCKET && keys == &vec!["a".to_string(), "b".to_string()])
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, keys| {
            Ok(DeleteBatch {
                deleted: keys,
                failed: vec![],
            })
        });
    store
        .expect_list_objects_page()
        .withf(|req| req.continuation_token.as_deref() == Some("b"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(ListPage {
                keys: vec!["c".into()],
                common_prefixes: vec![],
                next_token: None,
            })
        });
    store
        .expect_delete_objects()
        .withf(|_, keys| keys.len() == 1)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, keys| {
            Ok(DeleteBatch {
                deleted: keys,
                failed: vec![],
            })
        });

    let report = clear_bucket(&store, BUCKET, &Logger::new(0))?;
    assert_eq!(report.deleted, 3);
    Ok(())
}

#[test]
fn oversized_page_is_split_at_service_limit() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = MockObjectStore::new();
    let keys: Vec<String> = (0..MAX_DELETE_BATCH + 5).map(|i| format!("k{i}")).collect();

    store.expect_list_objects_page().times(1).returning(move |_| {
        Ok(ListPage {
            keys: keys.clone(),
            common_prefixes: vec![],
            next_token: None,
        })
    });
    store
        .expect_delete_objects()
        .withf(|_, keys| keys.len() <= MAX_DELETE_BATCH)
        .times(2)
        .returning(|_, keys| {
            Ok(DeleteBatch {
                deleted: keys,
                failed: vec![],
            })
        });

    let report = clear_bucket(&store, BUCKET, &Logger::new(0))?;
    assert_eq!(report.deleted, MAX_DELETE_BATCH + 5);
    Ok(())
}

#[test]
fn list_folders_returns_root_prefixes_across_pages() -> Result<(), Box<dyn std::error::Error>> {
    let store = InMemoryStore::new("https://example.invalid").with_page_size(2);
    store.insert(BUCKET, "input/data.csv", b"1");
    store.insert(BUCKET, "input/more.csv", b"1");
    store.insert(BUCKET, "output/data_processed.csv", b"1");
    store.insert(BUCKET, "output/deep/nested.csv", b"1");
    store.insert(BUCKET, "readme.txt", b"1");
    store.insert(BUCKET, "zeta/", b"");

    let folders = list_folders(&store, BUCKET, &Logger::new(0))?;

    assert_eq!(folders, vec!["input", "output", "zeta"]);
    Ok(())
}

#[test]
fn list_buckets_returns_names() -> Result<(), Box<dyn std::error::Error>> {
    let store = InMemoryStore::new("https://example.invalid");
    store.create_bucket("bucket-000002");
    store.create_bucket("words");

    let buckets = list_buckets(&store, &Logger::new(1))?;

    assert_eq!(buckets, vec!["bucket-000002", "words"]);
    Ok(())
}

#[test]
fn list_buckets_error_is_not_an_empty_list() {
    let mut store = MockObjectStore::new();
    store
        .expect_list_buckets()
        .returning(|| Err(StorageError::transfer("ListBuckets", "403 Forbidden")));

    let result = list_buckets(&store, &Logger::new(0));
    assert!(matches!(result, Err(StorageError::Transfer { .. })));
}

#[test]
fn listing_missing_bucket_is_not_found() {
    let store = InMemoryStore::new("https://example.invalid");
    let result = list_files(&store, "nope", &Logger::new(0));
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[test]
fn delete_file_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::new(0);
    let store = populated_store(3, 1000);

    delete_file(&store, BUCKET, "dir0/file00000.txt", &logger)?;
    delete_file(&store, BUCKET, "dir0/file00000.txt", &logger)?;

    assert!(store.object(BUCKET, "dir0/file00000.txt").is_none());
    assert_eq!(list_files(&store, BUCKET, &logger)?.len(), 2);
    Ok(())
}

#[test]
fn echoed_token_ends_the_listing() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = MockObjectStore::new();
    store.expect_list_objects_page().times(2).returning(|_| {
        Ok(ListPage {
            keys: vec!["same".into()],
            common_prefixes: vec![],
            next_token: Some("stuck".into()),
        })
    });

    let files = list_files(&store, BUCKET, &Logger::new(0))?;
    assert_eq!(files, vec!["same", "same"]);
    Ok(())
}
