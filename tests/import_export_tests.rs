use std::fs::{self, File};

use estimate_tool::calculations::{
    CrashingScenario, classify_pareto, cost_items, roll_up_project, simulate_crashing,
};
use estimate_tool::persistence::{
    export_frontier_csv, export_item_costs_csv, export_pareto_csv, export_s_curve_csv,
    load_items_from_csv, save_items_to_csv,
};
use estimate_tool::validation::{RecordKind, SnapshotIssue};
use estimate_tool::{
    BudgetItem, CrashingParameters, PersistenceError, ScheduleParameters,
    load_snapshot_from_json, save_snapshot_to_json,
};
use tempfile::NamedTempFile;

mod common;
use common::{d, sample_snapshot};

#[test]
fn json_snapshot_round_trip_preserves_data() {
    let mut snapshot = sample_snapshot();
    snapshot.items[0].progress_percent = Some(35.0);
    snapshot.items[1].start_date = Some(d(2025, 2, 3));
    snapshot.items[1].crews_assigned = Some(2);

    let tmp = NamedTempFile::new().unwrap();
    save_snapshot_to_json(&snapshot, tmp.path()).unwrap();
    let loaded = load_snapshot_from_json(tmp.path()).unwrap();

    assert_eq!(loaded, snapshot);
}

#[test]
fn loading_rejects_duplicate_ids_and_foreign_items() {
    let mut snapshot = sample_snapshot();
    snapshot.catalog.tasks.push(common::task("T1", "Masonry again", 1.0, 1.0));
    snapshot.items.push(BudgetItem::new("I9", "P2", "T1", 1.0));

    let tmp = NamedTempFile::new().unwrap();
    serde_json::to_writer(File::create(tmp.path()).unwrap(), &snapshot).unwrap();

    match load_snapshot_from_json(tmp.path()) {
        Err(PersistenceError::Validation(err)) => {
            assert!(err.issues.contains(&SnapshotIssue::DuplicateId {
                kind: RecordKind::Task,
                id: "T1".into(),
            }));
            assert!(err.issues.iter().any(|issue| matches!(
                issue,
                SnapshotIssue::ForeignItem { item_id, .. } if item_id == "I9"
            )));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn saving_an_invalid_snapshot_fails_before_writing() {
    let mut snapshot = sample_snapshot();
    snapshot.items.push(snapshot.items[0].clone());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("estimate.json");

    let result = save_snapshot_to_json(&snapshot, &path);
    assert!(matches!(result, Err(PersistenceError::Validation(_))));
    assert!(!path.exists());
}

#[test]
fn budget_items_csv_round_trip() {
    let mut items = sample_snapshot().items;
    items[0].manual_duration_days = Some(12);
    items[0].start_date = Some(d(2025, 3, 1));
    items[1].progress_percent = Some(62.5);
    items[1].snapshot_ref = Some("rev-2".into());

    let tmp = NamedTempFile::new().unwrap();
    save_items_to_csv(&items, tmp.path()).unwrap();
    let loaded = load_items_from_csv(tmp.path()).unwrap();

    assert_eq!(loaded, items);
}

#[test]
fn budget_items_csv_rejects_bad_dates_and_empty_files() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "id,project_id,task_id,quantity,manual_duration_days,start_date,progress_percent,crews_assigned,snapshot_ref\n\
         I1,P1,T1,3,,2025-13-01,,,\n",
    )
    .unwrap();
    match load_items_from_csv(tmp.path()) {
        Err(PersistenceError::InvalidData(msg)) => assert!(msg.contains("invalid date")),
        other => panic!("expected invalid data, got {other:?}"),
    }

    let empty = NamedTempFile::new().unwrap();
    fs::write(
        empty.path(),
        "id,project_id,task_id,quantity,manual_duration_days,start_date,progress_percent,crews_assigned,snapshot_ref\n",
    )
    .unwrap();
    assert!(matches!(
        load_items_from_csv(empty.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn report_exports_write_headers_and_rows() {
    let snapshot = sample_snapshot();
    let indexes = snapshot.indexes();
    let schedule = ScheduleParameters::default();
    let dir = tempfile::tempdir().unwrap();

    let costed = cost_items(&snapshot.project, &snapshot.items, &indexes, &schedule);
    let items_path = dir.path().join("items.csv");
    export_item_costs_csv(&costed.items, &items_path).unwrap();
    let contents = fs::read_to_string(&items_path).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("item_id,task_id,task_name"));
    assert!(lines.next().unwrap().starts_with("I1,T1,Masonry"));

    let pareto = classify_pareto(&snapshot.project, &snapshot.items, &indexes, &schedule);
    let pareto_path = dir.path().join("pareto.csv");
    export_pareto_csv(&pareto, &pareto_path).unwrap();
    let contents = fs::read_to_string(&pareto_path).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert!(contents.contains("I1,T1,Masonry"));

    let report = roll_up_project(
        &snapshot.project,
        &snapshot.items,
        &indexes,
        &[],
        d(2025, 1, 1),
        &schedule,
    );
    let curve_path = dir.path().join("scurve.csv");
    export_s_curve_csv(&report.s_curve, &curve_path).unwrap();
    let contents = fs::read_to_string(&curve_path).unwrap();
    assert!(contents.starts_with("bucket,date,planned,earned,actual"));
    assert!(contents.contains("2025-01-06"));

    let analysis = simulate_crashing(
        &snapshot.items[0],
        indexes.task("T1").unwrap(),
        &indexes,
        CrashingScenario::new(1, 50.0),
        &CrashingParameters::default(),
    );
    let frontier_path = dir.path().join("frontier.csv");
    export_frontier_csv(&analysis, &frontier_path).unwrap();
    let contents = fs::read_to_string(&frontier_path).unwrap();
    assert!(contents.starts_with("extra_crews,overtime_percent,crews,duration_days,cost"));
    assert_eq!(contents.lines().count(), 13);
}
