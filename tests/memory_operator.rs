use rax_storage::error::Operation;
use rax_storage::storage::{
    EntryKind, MemoryAdapter, NativeWriteOptions, StorageOperator, WriteOptions,
};
use rax_storage::visibility::{AclVisibility, ObjectAcl, Visibility};
use rax_storage::{PathPrefixer, StorageAdapter, StorageError, normalize_path};

fn operator(prefix: &str) -> StorageOperator<MemoryAdapter> {
    StorageOperator::new(MemoryAdapter::new(prefix), AclVisibility::default())
}

#[test]
fn test_normalize_then_prefix_round_trip() {
    let canonical = normalize_path("/something/deep/../../dirname").unwrap();
    assert_eq!(canonical, "dirname");

    let prefixer = PathPrefixer::new("prefix");
    let prefixed = prefixer.prefix_path(&canonical);
    assert_eq!(prefixed, "prefix/dirname");
    assert_eq!(prefixer.strip_prefix(&prefixed), "dirname");
}

#[tokio::test]
async fn test_write_prefixes_keys_and_reads_back() {
    let storage = operator("tenant-a");

    storage
        .write("\\docs\\.\\report.txt", b"hello", WriteOptions::default())
        .await
        .unwrap();

    assert_eq!(storage.adapter().keys().await, vec!["tenant-a/docs/report.txt"]);
    assert_eq!(storage.read("docs/report.txt").await.unwrap(), b"hello");
    assert_eq!(storage.read("/docs//report.txt").await.unwrap(), b"hello");
    assert!(storage.file_exists("docs/report.txt").await.unwrap());
    assert!(storage.directory_exists("docs").await.unwrap());
    assert!(!storage.file_exists("docs").await.unwrap());
    assert!(storage.has("docs").await.unwrap());
}

#[tokio::test]
async fn test_traversal_never_reaches_the_adapter() {
    let storage = operator("tenant-a");

    for path in ["../tenant-b/secret.txt", "a/../../x", "\\..\\x"] {
        let err = storage
            .write(path, b"nope", WriteOptions::default())
            .await
            .unwrap_err();
        match err {
            StorageError::PathTraversal { path: reported } => assert_eq!(reported, path),
            other => panic!("unexpected error for {path:?}: {other}"),
        }
    }

    assert!(storage.adapter().keys().await.is_empty());
}

#[tokio::test]
async fn test_visibility_round_trips_through_acls() {
    let storage = operator("");

    storage
        .write("public.txt", b"1", WriteOptions::default().visibility(Visibility::Public))
        .await
        .unwrap();
    storage
        .write("private.txt", b"2", WriteOptions::default().visibility(Visibility::Private))
        .await
        .unwrap();

    assert_eq!(storage.visibility("public.txt").await.unwrap(), Visibility::Public);
    assert_eq!(storage.visibility("private.txt").await.unwrap(), Visibility::Private);

    storage
        .set_visibility("public.txt", Visibility::Private)
        .await
        .unwrap();
    assert_eq!(storage.visibility("public.txt").await.unwrap(), Visibility::Private);
}

#[tokio::test]
async fn test_unrecognized_acl_uses_fallback() {
    let storage = StorageOperator::new(
        MemoryAdapter::new("").with_default_acl(ObjectAcl::PublicReadWrite),
        AclVisibility::default(),
    );

    storage
        .write("shared.txt", b"", WriteOptions::default())
        .await
        .unwrap();
    assert_eq!(storage.visibility("shared.txt").await.unwrap(), Visibility::Public);
}

#[tokio::test]
async fn test_listing_returns_canonical_paths() {
    let storage = operator("bucket/prefix");

    for path in ["a.txt", "dir/b.txt", "dir/sub/c.txt"] {
        storage
            .write(path, path.as_bytes(), WriteOptions::default())
            .await
            .unwrap();
    }
    storage
        .create_directory("empty", WriteOptions::default())
        .await
        .unwrap();

    let shallow: Vec<(String, EntryKind)> = storage
        .list_contents("", false)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| (entry.path, entry.kind))
        .collect();
    assert_eq!(
        shallow,
        vec![
            ("a.txt".to_string(), EntryKind::File),
            ("dir".to_string(), EntryKind::Directory),
            ("empty".to_string(), EntryKind::Directory),
        ]
    );

    let deep: Vec<String> = storage
        .list_contents("/dir/", true)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.path)
        .collect();
    assert_eq!(deep, vec!["dir/b.txt", "dir/sub", "dir/sub/c.txt"]);

    let empty = storage.list_contents("empty", false).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_directory_visibility_uses_directory_slots() {
    let storage = operator("");

    storage
        .create_directory("open", WriteOptions::default())
        .await
        .unwrap();
    storage
        .create_directory(
            "closed",
            WriteOptions::default().directory_visibility(Visibility::Private),
        )
        .await
        .unwrap();

    let listing = storage.list_contents("", false).await.unwrap();
    let visibility_of = |name: &str| {
        listing
            .iter()
            .find(|entry| entry.path == name)
            .and_then(|entry| entry.visibility)
    };
    assert_eq!(visibility_of("open"), Some(Visibility::Public));
    assert_eq!(visibility_of("closed"), Some(Visibility::Private));
}

#[tokio::test]
async fn test_copy_retains_visibility_unless_disabled() {
    let storage = operator("");
    storage
        .write("src.txt", b"data", WriteOptions::default().visibility(Visibility::Public))
        .await
        .unwrap();

    storage
        .copy_file("src.txt", "kept.txt", WriteOptions::default())
        .await
        .unwrap();
    storage
        .copy_file(
            "src.txt",
            "reset.txt",
            WriteOptions::default().retain_visibility(false),
        )
        .await
        .unwrap();

    assert_eq!(storage.visibility("kept.txt").await.unwrap(), Visibility::Public);
    assert_eq!(storage.visibility("reset.txt").await.unwrap(), Visibility::Private);
    assert_eq!(storage.read("kept.txt").await.unwrap(), b"data");
}

#[tokio::test]
async fn test_move_and_delete() {
    let storage = operator("p");
    storage
        .write("from.txt", b"x", WriteOptions::default())
        .await
        .unwrap();

    storage
        .move_file("from.txt", "./from.txt", WriteOptions::default())
        .await
        .unwrap();
    assert!(storage.file_exists("from.txt").await.unwrap());

    storage
        .move_file("from.txt", "moved/to.txt", WriteOptions::default())
        .await
        .unwrap();
    assert!(!storage.file_exists("from.txt").await.unwrap());
    assert_eq!(storage.read("moved/to.txt").await.unwrap(), b"x");

    storage.delete("moved/to.txt").await.unwrap();
    storage.delete("moved/to.txt").await.unwrap();
    assert!(!storage.has("moved").await.unwrap());
}

#[tokio::test]
async fn test_errors_use_caller_paths() {
    let storage = operator("hidden-root");

    match storage.read("/missing/../file.txt").await.unwrap_err() {
        StorageError::FileNotFound(path) => assert_eq!(path, "file.txt"),
        other => panic!("unexpected error: {other}"),
    }
    match storage
        .move_file("nope.txt", "other.txt", WriteOptions::default())
        .await
        .unwrap_err()
    {
        StorageError::FileNotFound(path) => assert_eq!(path, "nope.txt"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_delete_directory_refuses_root() {
    let storage = operator("");
    storage
        .write("dir/a.txt", b"", WriteOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        storage.delete_directory("dir/..").await,
        Err(StorageError::Rejected { location, .. }) if location.is_empty()
    ));

    storage.delete_directory("dir").await.unwrap();
    assert!(storage.adapter().keys().await.is_empty());
}

#[tokio::test]
async fn test_metadata_reports_size_and_kind() {
    let storage = operator("");
    storage
        .write("sized.bin", &[0u8; 42], WriteOptions::default())
        .await
        .unwrap();

    assert_eq!(storage.file_size("sized.bin").await.unwrap(), 42);
    assert!(storage.last_modified("sized.bin").await.unwrap() > 0);

    storage
        .write("dir/inner.txt", b"", WriteOptions::default())
        .await
        .unwrap();
    let dir = storage.metadata("dir").await.unwrap();
    assert!(dir.is_dir());
    assert_eq!(dir.size, None);
    assert!(matches!(
        storage.file_size("dir").await,
        Err(StorageError::Rejected { .. })
    ));
    assert!(matches!(
        storage.metadata("nothing-here").await,
        Err(StorageError::FileNotFound(_))
    ));
}

#[tokio::test]
async fn test_move_and_copy_refuse_the_root_as_destination() {
    let storage = operator("bucket");
    storage
        .write("a.txt", b"keep me", WriteOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        storage.move_file("a.txt", "", WriteOptions::default()).await,
        Err(StorageError::Rejected { operation: Operation::MoveFile, location, .. })
            if location.is_empty()
    ));
    assert!(matches!(
        storage.copy_file("a.txt", "dir/..", WriteOptions::default()).await,
        Err(StorageError::Rejected { operation: Operation::CopyFile, .. })
    ));

    assert_eq!(storage.adapter().keys().await, vec!["bucket/a.txt"]);
    assert_eq!(storage.read("a.txt").await.unwrap(), b"keep me");
}

#[tokio::test]
async fn test_adapter_refuses_directory_keys_as_destination() {
    let adapter = MemoryAdapter::new("bucket");
    let options = NativeWriteOptions {
        file: None,
        directory: ObjectAcl::Private,
    };
    adapter.write("bucket/a.txt", b"x", options).await.unwrap();

    for destination in ["bucket/", "bucket/dir/", ""] {
        assert!(matches!(
            adapter.move_file("bucket/a.txt", destination, options).await,
            Err(StorageError::Rejected { .. })
        ));
        assert!(matches!(
            adapter.copy_file("bucket/a.txt", destination, options).await,
            Err(StorageError::Rejected { .. })
        ));
    }

    assert_eq!(adapter.keys().await, vec!["bucket/a.txt"]);
}

#[tokio::test]
async fn test_root_exists_for_any_prefix() {
    for prefix in ["", "bucket", "/nested/prefix/"] {
        let storage = operator(prefix);

        assert!(storage.directory_exists("").await.unwrap(), "{prefix:?}");
        assert!(storage.has("/").await.unwrap(), "{prefix:?}");
        assert!(storage.metadata("").await.unwrap().is_dir(), "{prefix:?}");

        storage
            .write("a.txt", b"", WriteOptions::default())
            .await
            .unwrap();
        assert!(storage.directory_exists(".").await.unwrap(), "{prefix:?}");
        let root = storage.metadata("").await.unwrap();
        assert!(root.is_dir(), "{prefix:?}");
        assert_eq!(root.size, None);
    }
}
