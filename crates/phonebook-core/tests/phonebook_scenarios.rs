//! End-to-end behaviour of the mediator against both storage backends.

use phonebook_core::typed::{
    CreateEntry, DeleteEntry, GetAllEntries, GetEntryById, GetEntryByName, UpdateEntry,
};
use std::time::Duration;

use phonebook_core::{
    AppBuilder, EntryFields, EntryId, Mediator, PhonebookError, StorageConfig,
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

fn mediator(config: StorageConfig) -> Mediator {
    AppBuilder::new().storage(config).build().expect("build app").mediator
}

fn john() -> EntryFields {
    EntryFields::new("John Doe", "123-456-7890")
}

fn jane() -> EntryFields {
    EntryFields::new("Jane Smith", "987-654-3210")
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn create_two_then_list(#[case] config: StorageConfig) {
    let m = mediator(config);
    let cancel = CancellationToken::new();

    let first = m.send(CreateEntry { entry: john() }, &cancel).await.unwrap();
    assert_eq!(first.id, EntryId::new(1));
    assert_eq!(first.name, "John Doe");
    assert_eq!(first.phone_number, "123-456-7890");

    let second = m.send(CreateEntry { entry: jane() }, &cancel).await.unwrap();
    assert!(second.id.get() > 0);

    let all = m.send(GetAllEntries, &cancel).await.unwrap();
    assert_eq!(all, vec![first, second]);
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn unknown_ids_are_absent_not_errors(#[case] config: StorageConfig) {
    let m = mediator(config);
    let cancel = CancellationToken::new();
    m.send(CreateEntry { entry: john() }, &cancel).await.unwrap();

    let missing = EntryId::new(999);
    assert_eq!(m.send(GetEntryById { id: missing }, &cancel).await.unwrap(), None);
    assert!(!m.send(UpdateEntry { id: missing, entry: jane() }, &cancel).await.unwrap());
    assert!(!m.send(DeleteEntry { id: missing }, &cancel).await.unwrap());

    // get-all は影響を受けない
    let all = m.send(GetAllEntries, &cancel).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "John Doe");
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn lookup_by_name_ignores_case(#[case] config: StorageConfig) {
    let m = mediator(config);
    let cancel = CancellationToken::new();
    let created = m.send(CreateEntry { entry: john() }, &cancel).await.unwrap();

    let found = m
        .send(GetEntryByName { name: "john doe".into() }, &cancel)
        .await
        .unwrap();
    assert_eq!(found, Some(created));
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn lookup_by_name_folds_non_ascii_case(#[case] config: StorageConfig) {
    let m = mediator(config);
    let cancel = CancellationToken::new();
    let created = m
        .send(CreateEntry { entry: EntryFields::new("Émile Zoë", "555-0100") }, &cancel)
        .await
        .unwrap();

    for name in ["émile zoë", "ÉMILE ZOË"] {
        let found = m.send(GetEntryByName { name: name.into() }, &cancel).await.unwrap();
        assert_eq!(found.as_ref(), Some(&created), "lookup by {name}");
    }
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn update_then_get_reflects_new_phone(#[case] config: StorageConfig) {
    let m = mediator(config);
    let cancel = CancellationToken::new();
    let created = m.send(CreateEntry { entry: john() }, &cancel).await.unwrap();

    let updated = m
        .send(
            UpdateEntry { id: created.id, entry: EntryFields::new("John Doe", "555-0199") },
            &cancel,
        )
        .await
        .unwrap();
    assert!(updated);

    let found = m.send(GetEntryById { id: created.id }, &cancel).await.unwrap().unwrap();
    assert_eq!(found.name, "John Doe");
    assert_eq!(found.phone_number, "555-0199");
    assert_eq!(found.id, created.id);
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn delete_then_get_is_absent(#[case] config: StorageConfig) {
    let m = mediator(config);
    let cancel = CancellationToken::new();
    let created = m.send(CreateEntry { entry: john() }, &cancel).await.unwrap();

    assert!(m.send(DeleteEntry { id: created.id }, &cancel).await.unwrap());
    assert_eq!(m.send(GetEntryById { id: created.id }, &cancel).await.unwrap(), None);
    assert!(!m.send(DeleteEntry { id: created.id }, &cancel).await.unwrap());
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test]
async fn empty_store_lists_nothing(#[case] config: StorageConfig) {
    let m = mediator(config);
    let all = m.send(GetAllEntries, &CancellationToken::new()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let m = mediator(StorageConfig::in_memory());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let m = m.clone();
            tokio::spawn(async move {
                let entry = EntryFields::new(format!("Person {i}"), "555-0000");
                m.send(CreateEntry { entry }, &CancellationToken::new()).await.unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}

#[rstest]
#[case::in_memory(StorageConfig::in_memory())]
#[case::sqlite(StorageConfig::sqlite(":memory:"))]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_creates_are_never_committed(#[case] config: StorageConfig) {
    let m = mediator(config);

    let tasks: Vec<_> = (0..200)
        .map(|i| {
            let m = m.clone();
            tokio::spawn(async move {
                let cancel = CancellationToken::new();
                let trigger = cancel.clone();
                let entry = EntryFields::new(format!("Person {i}"), "555-0000");
                let send = m.send(CreateEntry { entry }, &cancel);
                let fire = async move {
                    tokio::time::sleep(Duration::from_micros(50)).await;
                    trigger.cancel();
                };
                let (result, ()) = tokio::join!(send, fire);
                result
            })
        })
        .collect();

    let mut created = 0;
    let mut cancelled = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(PhonebookError::Cancelled) => cancelled += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let all = m.send(GetAllEntries, &CancellationToken::new()).await.unwrap();
    assert_eq!(all.len(), created, "{cancelled} cancelled creates");
    assert_eq!(created + cancelled, 200);
}
