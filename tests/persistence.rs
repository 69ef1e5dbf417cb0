use std::fs;

use chrono::{Duration, NaiveDate};
use tempfile::tempdir;

use task_planner::{
    Clock, Error, FixedClock, Format, Priority, Status, TaskStore, TaskUpdate,
};

fn clock() -> FixedClock {
    FixedClock::new(
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_milli_opt(14, 5, 9, 321)
            .unwrap(),
    )
}

fn populated_store() -> TaskStore<FixedClock> {
    let mut store = TaskStore::new(clock());
    let today = store.clock().today();
    store
        .create("Prepare slides", "for Monday", Status::InProgress, Priority::High, Some(today))
        .unwrap();
    store.clock().advance(Duration::seconds(90));
    store
        .create("Book flights", "", Status::Todo, Priority::Medium, Some(today + Duration::days(10)))
        .unwrap();
    store.clock().advance(Duration::minutes(3));
    store
        .create("Old idea", "maybe later", Status::Cancelled, Priority::Low, None)
        .unwrap();
    store.clock().advance(Duration::hours(1));
    store
        .update(
            2,
            TaskUpdate {
                status: Some(Status::Done),
                ..Default::default()
            },
        )
        .unwrap();
    store
}

#[test]
fn csv_save_then_load_restores_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let original = populated_store();
    original.save_to(Format::Csv, &path).unwrap();

    let mut loaded = TaskStore::new(clock());
    let report = loaded.load_from(Format::Csv, &path).unwrap().unwrap();
    assert_eq!(report.loaded, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(loaded.snapshot(), original.snapshot());
    assert_eq!(loaded.next_id(), 4);
}

#[test]
fn json_save_then_load_restores_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let original = populated_store();
    original.save_to(Format::Json, &path).unwrap();

    let mut loaded = TaskStore::new(clock());
    loaded.load_from(Format::Json, &path).unwrap().unwrap();
    assert_eq!(loaded.snapshot(), original.snapshot());
    assert_eq!(loaded.next_id(), 4);
}

#[test]
fn empty_collection_round_trips_with_next_id_one() {
    let dir = tempdir().unwrap();
    for format in [Format::Csv, Format::Json] {
        let path = dir.path().join(format.default_file_name());
        TaskStore::new(clock()).save_to(format, &path).unwrap();

        let mut loaded = populated_store();
        let report = loaded.load_from(format, &path).unwrap().unwrap();
        assert_eq!(report.loaded, 0);
        assert!(loaded.is_empty());
        assert_eq!(loaded.next_id(), 1);
    }
}

#[test]
fn load_resets_next_id_past_highest_loaded_id() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");

    let mut store = TaskStore::new(clock());
    for title in ["a", "b", "c", "d", "e", "f", "g", "h", "i"] {
        store.create(title, "", Status::Todo, Priority::Low, None).unwrap();
    }
    for id in [1, 3, 4, 6, 7, 8] {
        assert!(store.delete(id));
    }
    let ids: Vec<u64> = store.snapshot().iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![2, 5, 9]);
    store.save_to(Format::Csv, &path).unwrap();

    let mut loaded = TaskStore::new(clock());
    loaded.load_from(Format::Csv, &path).unwrap();
    assert_eq!(loaded.next_id(), 10);
    let next = loaded
        .create("after load", "", Status::Todo, Priority::Low, None)
        .unwrap()
        .id();
    assert_eq!(next, 10);
}

#[test]
fn missing_file_loads_nothing_without_error() {
    let dir = tempdir().unwrap();
    for format in [Format::Csv, Format::Json] {
        let mut store = TaskStore::new(clock());
        let outcome = store
            .load_from(format, &dir.path().join("does-not-exist"))
            .unwrap();
        assert!(outcome.is_none());
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);
    }
}

#[test]
fn unreadable_path_is_an_io_error() {
    let dir = tempdir().unwrap();
    let mut store = TaskStore::new(clock());
    // A directory exists but cannot be read as a file.
    let err = store.load_from(Format::Csv, dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn unwritable_path_is_an_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("tasks.csv");
    let err = populated_store().save_to(Format::Csv, &path).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(!path.exists());
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    populated_store().save_to(Format::Json, &path).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["tasks.json".to_string()]);
}

#[test]
fn malformed_lines_do_not_abort_csv_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    populated_store().save_to(Format::Csv, &path).unwrap();

    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("12;Broken;;TODO;NOPE;;2024-06-03T10:00:00;2024-06-03T10:00:00\n");
    text.push_str("13;Fine;;TODO;LOW;;2024-06-03T10:00:00;2024-06-03T10:00:00\n");
    fs::write(&path, text).unwrap();

    let mut store = TaskStore::new(clock());
    let report = store.load_from(Format::Csv, &path).unwrap().unwrap();
    assert_eq!(report.loaded, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].position, 5);
    assert!(store.find_by_id(12).is_none());
    assert_eq!(store.next_id(), 14);
}

#[test]
fn csv_and_json_agree_after_cross_conversion() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("tasks.csv");
    let json_path = dir.path().join("tasks.json");

    let original = populated_store();
    original.save_to(Format::Csv, &csv_path).unwrap();

    let mut via_csv = TaskStore::new(clock());
    via_csv.load_from(Format::Csv, &csv_path).unwrap();
    via_csv.save_to(Format::Json, &json_path).unwrap();

    let mut via_json = TaskStore::new(clock());
    via_json.load_from(Format::Json, &json_path).unwrap();
    assert_eq!(via_json.snapshot(), original.snapshot());
}

#[test]
fn json_line_breaks_survive_into_csv_store() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("tasks.json");
    let csv_path = dir.path().join("tasks.csv");
    fs::write(
        &json_path,
        r#"[{"id": 7, "title": "first\nsecond", "description": "line1\r\nline2", "status": "TODO", "priority": "LOW", "deadline": "", "createdAt": "2024-06-03T10:00:00", "updatedAt": "2024-06-03T10:00:00"}]"#,
    )
    .unwrap();

    let mut store = TaskStore::new(clock());
    store.load_from(Format::Json, &json_path).unwrap();
    store.save_to(Format::Csv, &csv_path).unwrap();

    let mut reloaded = TaskStore::new(clock());
    let report = reloaded.load_from(Format::Csv, &csv_path).unwrap().unwrap();
    assert_eq!(report.loaded, 1);
    assert!(report.skipped.is_empty());
    let task = reloaded.find_by_id(7).unwrap();
    assert_eq!(task.title(), "first second");
    assert_eq!(task.description(), "line1 line2");
}

#[test]
fn oversized_id_is_skipped_and_allocation_continues() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let mut text = String::from("header\n");
    text.push_str("18446744073709551615;t;;TODO;LOW;;2024-06-03T10:00:00;2024-06-03T10:00:00\n");
    text.push_str("4;u;;TODO;LOW;;2024-06-03T10:00:00;2024-06-03T10:00:00\n");
    fs::write(&path, text).unwrap();

    let mut store = TaskStore::new(clock());
    let report = store.load_from(Format::Csv, &path).unwrap().unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(store.next_id(), 5);
    let id = store
        .create("next", "", Status::Todo, Priority::Low, None)
        .unwrap()
        .id();
    assert_eq!(id, 5);
}
