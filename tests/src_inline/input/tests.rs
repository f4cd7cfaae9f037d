use std::path::{Path, PathBuf};

use super::*;

const HEADER: &str =
    "Name,Extraversion Score,Agreeableness Score,Conscientiousness Score,Neuroticism Score,Openness Score";

fn write_csv(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("scores.csv");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_check_schema_reports_every_missing_column() {
    let headers = [
        "Name",
        "Extraversion Score",
        "Agreeableness Score",
        "Conscientiousness Score",
    ];
    match check_schema(headers) {
        Err(InputError::Schema { missing }) => {
            assert_eq!(missing, vec!["Neuroticism Score", "Openness Score"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_check_schema_accepts_extra_columns() {
    let mut headers = required_columns();
    headers.insert(0, "Email");
    assert!(check_schema(headers).is_ok());
}

#[test]
fn test_load_preserves_row_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        &format!("{HEADER},Email\nCarol,3,1,2,3,4,c@x\nAlice,4,2.5,3,1,5,a@x\nBob,2,3,4,5,1,b@x\n"),
    );
    let table = load_score_table(&path).unwrap();
    let names: Vec<&str> = table.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Alice", "Bob"]);
    assert_eq!(table.records[1].raw[Trait::Agreeableness], 2.5);
    assert_eq!(table.records[2].raw[Trait::Openness], 1.0);
}

#[test]
fn test_load_columns_in_any_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "Openness Score,Name,Neuroticism Score,Conscientiousness Score,Agreeableness Score,Extraversion Score\n5,\"Smith, Ann\",4,3,2,1\n",
    );
    let table = load_score_table(&path).unwrap();
    let record = &table.records[0];
    assert_eq!(record.name, "Smith, Ann");
    assert_eq!(record.raw[Trait::Extraversion], 1.0);
    assert_eq!(record.raw[Trait::Openness], 5.0);
}

#[test]
fn test_load_rejects_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "Name,Extraversion Score\nAlice,4\n");
    match load_score_table(&path) {
        Err(InputError::Schema { missing }) => assert_eq!(missing.len(), 4),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_load_non_numeric_score_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        &format!("{HEADER}\nAlice,4,3,2,1,5\nBob,4,three,2,1,5\n"),
    );
    match load_score_table(&path) {
        Err(InputError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_load_rejects_non_finite_score() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &format!("{HEADER}\nAlice,4,3,NaN,1,5\n"));
    assert!(matches!(
        load_score_table(&path),
        Err(InputError::Parse { line: 2, .. })
    ));
}

#[test]
fn test_duplicate_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        &format!("{HEADER}\nAlice,4,3,2,1,5\nBob,1,1,1,1,1\nAlice,2,2,2,2,2\n"),
    );
    match load_score_table(&path) {
        Err(InputError::DuplicateNames { names }) => assert_eq!(names, vec!["Alice / Alice"]),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_names_colliding_after_sanitizing_are_rejected() {
    let table = ScoreTable {
        records: vec![
            ScoreRecord {
                name: "a/b".to_string(),
                raw: TraitMap::from_fn(|_| 3.0),
            },
            ScoreRecord {
                name: "a_b".to_string(),
                raw: TraitMap::from_fn(|_| 3.0),
            },
        ],
    };
    assert!(matches!(
        check_unique_names(&table),
        Err(InputError::DuplicateNames { .. })
    ));
}

#[test]
fn test_header_only_table_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &format!("{HEADER}\n"));
    assert!(load_score_table(&path).unwrap().is_empty());
}

#[test]
fn test_list_candidates_filters_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.csv", "a.CSV", "notes.txt"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    std::fs::create_dir(dir.path().join("dir.csv")).unwrap();
    assert_eq!(
        list_candidates(dir.path(), "csv").unwrap(),
        vec!["a.CSV".to_string(), "b.csv".to_string()]
    );
}

#[test]
fn test_load_narrative_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("para.txt");
    std::fs::write(&path, "Thank you for taking part.\n\nSecond paragraph.").unwrap();
    let narrative = load_narrative(&path).unwrap();
    assert_eq!(narrative.text(), "Thank you for taking part.\n\nSecond paragraph.");
    assert!(matches!(
        load_narrative(&dir.path().join("missing.txt")),
        Err(InputError::Io { .. })
    ));
}
