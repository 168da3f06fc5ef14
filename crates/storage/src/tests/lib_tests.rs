use super::*;

async fn storage_with(names: &[&str]) -> (Storage, Vec<GroupId>) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut ids = Vec::new();
    for name in names {
        ids.push(storage.create_group(name).await.expect("group"));
    }
    (storage, ids)
}

#[tokio::test]
async fn creates_and_lists_groups() {
    let (storage, ids) = storage_with(&["web", "db"]).await;
    let groups = storage.list_groups().await.expect("list");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0], Group::new(ids[1], "db"));
    assert_eq!(
        storage.get_group(ids[0]).await.expect("get"),
        Some(Group::new(ids[0], "web"))
    );
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn rejects_blank_group_name() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.create_group("   ").await.is_err());
}

#[tokio::test]
async fn associates_and_disassociates_children() {
    let (storage, ids) = storage_with(&["parent", "child"]).await;
    let (parent, child) = (ids[0], ids[1]);

    storage.associate(child, parent).await.expect("associate");
    assert_eq!(storage.children_of(parent).await.expect("children"), vec![child]);
    assert_eq!(storage.parents_of(child).await.expect("parents"), vec![parent]);

    storage.disassociate(child, parent).await.expect("disassociate");
    assert!(storage.parents_of(child).await.expect("parents").is_empty());
}

#[tokio::test]
async fn rejects_duplicate_and_self_association() {
    let (storage, ids) = storage_with(&["parent", "child"]).await;
    storage.associate(ids[1], ids[0]).await.expect("associate");

    let duplicate = storage.associate(ids[1], ids[0]).await.expect_err("duplicate");
    assert!(duplicate.to_string().contains("already a child"));

    let itself = storage.associate(ids[0], ids[0]).await.expect_err("self");
    assert!(itself.to_string().contains("itself"));
}

#[tokio::test]
async fn rejects_cyclical_association() {
    let (storage, ids) = storage_with(&["a", "b", "c"]).await;
    storage.associate(ids[1], ids[0]).await.expect("b under a");
    storage.associate(ids[2], ids[1]).await.expect("c under b");

    assert!(storage.is_descendant(ids[0], ids[2]).await.expect("walk"));
    let err = storage.associate(ids[0], ids[2]).await.expect_err("cycle");
    assert!(err.to_string().contains("cyclical group association"));
}

#[tokio::test]
async fn rejects_unknown_groups_and_missing_links() {
    let (storage, ids) = storage_with(&["only"]).await;

    let unknown = storage
        .associate(ids[0], GroupId(999))
        .await
        .expect_err("unknown parent");
    assert!(unknown.to_string().contains("does not exist"));

    let missing = storage
        .disassociate(ids[0], GroupId(999))
        .await
        .expect_err("no link");
    assert!(missing.to_string().contains("is not a child"));
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("group_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("inventory.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}
