#![forbid(unsafe_code)]

use std::path::PathBuf;
use tb_core::model::{NewTestRecord, TestFilter};
use tb_core::profile::SchemaProfile;
use tb_storage::{SqliteStore, StoreError};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("tb_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open(test_name: &str, profile: SchemaProfile) -> SqliteStore {
    SqliteStore::open(temp_dir(test_name).join("test.db"), profile).expect("open store")
}

fn categorized(topic: &str, section: &str, question: &str, answer: &str) -> NewTestRecord {
    NewTestRecord {
        topic: Some(topic.to_string()),
        section: Some(section.to_string()),
        question: Some(question.to_string()),
        answer: Some(answer.to_string()),
    }
}

fn plain(question: &str, answer: &str) -> NewTestRecord {
    NewTestRecord {
        question: Some(question.to_string()),
        answer: Some(answer.to_string()),
        ..NewTestRecord::default()
    }
}

#[test]
fn create_returns_positive_id_and_list_returns_fields() {
    let mut store = open("create_list", SchemaProfile::Indexed);

    let id = store
        .create_test(categorized("Bio", "Cells", "Q1", "A1"))
        .expect("create");
    assert_eq!(id, 1);

    let listed = store.list_tests().expect("list");
    assert_eq!(listed.len(), 1);
    let record = &listed[0];
    assert_eq!(record.id, id);
    assert_eq!(record.topic.as_deref(), Some("Bio"));
    assert_eq!(record.section.as_deref(), Some("Cells"));
    assert_eq!(record.question, "Q1");
    assert_eq!(record.answer, "A1");
    assert!(!record.created_at.is_empty(), "createdAt must be set");
}

#[test]
fn list_is_newest_first_even_within_one_second() {
    let mut store = open("newest_first", SchemaProfile::Categorized);
    for question in ["A", "B", "C"] {
        store
            .create_test(categorized("T", "S", question, "x"))
            .expect("create");
    }

    let questions = store
        .list_tests()
        .expect("list")
        .into_iter()
        .map(|record| record.question)
        .collect::<Vec<_>>();
    assert_eq!(questions, vec!["C", "B", "A"]);
}

#[test]
fn empty_store_lists_nothing() {
    let store = open("empty", SchemaProfile::Plain);
    assert!(store.list_tests().expect("list").is_empty());
    assert_eq!(store.count_tests().expect("count"), 0);
}

#[test]
fn missing_required_field_is_a_storage_failure() {
    let mut store = open("missing_field", SchemaProfile::Indexed);
    let err = store
        .create_test(NewTestRecord {
            topic: Some("Bio".to_string()),
            section: None,
            question: Some("Q".to_string()),
            answer: Some("A".to_string()),
        })
        .expect_err("section is required");
    match err {
        StoreError::Sql(_) => {
            assert!(
                err.engine_message().contains("NOT NULL"),
                "unexpected message: {}",
                err.engine_message()
            );
        }
        other => panic!("expected Sql error, got {other:?}"),
    }
    assert_eq!(store.count_tests().expect("count"), 0);
}

#[test]
fn empty_question_is_rejected_by_the_schema() {
    let mut store = open("empty_question", SchemaProfile::Plain);
    let err = store.create_test(plain("", "A")).expect_err("empty question");
    assert!(matches!(err, StoreError::Sql(_)), "got {err:?}");
}

#[test]
fn delete_twice_reports_unknown_id_the_second_time() {
    for profile in SchemaProfile::ALL {
        let mut store = open(&format!("delete_twice_{profile}"), profile);
        let id = store
            .create_test(categorized("Math", "Algebra", "Q", "A"))
            .expect("create");

        store.delete_test(id).expect("first delete");
        assert!(store.list_tests().expect("list").is_empty());

        let err = store.delete_test(id).expect_err("second delete");
        assert!(matches!(err, StoreError::UnknownId), "{profile}: got {err:?}");
    }
}

#[test]
fn ids_are_never_reused() {
    let mut store = open("ids_not_reused", SchemaProfile::Plain);
    let first = store.create_test(plain("Q1", "A1")).expect("create");
    let second = store.create_test(plain("Q2", "A2")).expect("create");
    store.delete_test(second).expect("delete");

    let third = store.create_test(plain("Q3", "A3")).expect("create");
    assert!(third > second && second > first);
}

#[test]
fn get_returns_record_or_unknown_id() {
    let mut store = open("get", SchemaProfile::Plain);
    let id = store.create_test(plain("Q", "A")).expect("create");

    let record = store.get_test(id).expect("get");
    assert_eq!(record.question, "Q");
    assert_eq!(record.topic, None);
    assert_eq!(record.section, None);

    assert!(matches!(store.get_test(id + 1), Err(StoreError::UnknownId)));
}

#[test]
fn plain_profile_ignores_topic_and_section() {
    let mut store = open("plain_ignores", SchemaProfile::Plain);
    store
        .create_test(categorized("Bio", "Cells", "Q", "A"))
        .expect("create");

    let record = &store.list_tests().expect("list")[0];
    assert_eq!(record.topic, None);
    assert!(matches!(
        store.list_topics(),
        Err(StoreError::InvalidInput(_))
    ));
}

#[test]
fn filtered_list_ands_present_filters() {
    let mut store = open("filtered", SchemaProfile::Categorized);
    let algebra = store
        .create_test(categorized("Math", "Algebra", "Q1", "A1"))
        .expect("create");
    let geometry = store
        .create_test(categorized("Math", "Geometry", "Q2", "A2"))
        .expect("create");
    let bio_algebra = store
        .create_test(categorized("Bio", "Algebra", "Q3", "A3"))
        .expect("create");

    let ids = |filter: TestFilter| {
        store
            .list_filtered_tests(&filter)
            .expect("filtered")
            .into_iter()
            .map(|record| record.id)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        ids(TestFilter::new(
            Some("Math".to_string()),
            Some("Algebra".to_string())
        )),
        vec![algebra]
    );
    assert_eq!(
        ids(TestFilter::new(Some("Math".to_string()), None)),
        vec![geometry, algebra]
    );
    assert_eq!(
        ids(TestFilter::new(None, Some("Algebra".to_string()))),
        vec![bio_algebra, algebra]
    );
    assert_eq!(
        ids(TestFilter::new(Some(String::new()), None)),
        vec![bio_algebra, geometry, algebra]
    );
    assert!(ids(TestFilter::new(Some("Chem".to_string()), None)).is_empty());
}

#[test]
fn distinct_topics_and_sections_are_sorted() {
    let mut store = open("distinct", SchemaProfile::Indexed);
    for (topic, section) in [
        ("Math", "Geometry"),
        ("Bio", "Cells"),
        ("Math", "Algebra"),
        ("Math", "Algebra"),
    ] {
        store
            .create_test(categorized(topic, section, "Q", "A"))
            .expect("create");
    }

    assert_eq!(store.list_topics().expect("topics"), vec!["Bio", "Math"]);
    assert_eq!(
        store.list_sections(None).expect("sections"),
        vec!["Algebra", "Cells", "Geometry"]
    );
    assert_eq!(
        store.list_sections(Some("Math")).expect("sections"),
        vec!["Algebra", "Geometry"]
    );
    assert_eq!(
        store.list_sections(Some("")).expect("sections"),
        vec!["Algebra", "Cells", "Geometry"]
    );
    assert!(store.list_sections(Some("Chem")).expect("sections").is_empty());
}
