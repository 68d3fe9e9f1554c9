use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::Sandbox;

#[test]
fn new_record_then_describe() {
    let sandbox = Sandbox::new();
    let record = sandbox.path("dentist.rec");

    sandbox
        .datebook()
        .args([
            "new",
            "--start",
            "2004-03-02T09:00",
            "--end",
            "10:30",
            "--description",
            "Dentist",
            "--alarm",
            "15",
            "--out",
        ])
        .arg(&record)
        .assert()
        .success()
        .stdout(contains("Wrote"));

    sandbox
        .datebook()
        .arg("describe")
        .arg(&record)
        .assert()
        .success()
        .stdout(contains("start=2004-03-02 09:00, end=2004-03-02 10:30"))
        .stdout(contains("description=Dentist"))
        .stdout(contains("advance=15, advanceUnits=Minutes"))
        .stdout(contains("repeatType=None"));
}

#[test]
fn describe_rejects_garbage() {
    let sandbox = Sandbox::new();
    let record = sandbox.path("garbage.rec");
    std::fs::write(&record, [1u8, 2, 3]).unwrap();

    sandbox
        .datebook()
        .arg("describe")
        .arg(&record)
        .assert()
        .failure()
        .stderr(contains("not a valid appointment record"));
}

#[test]
fn new_requires_an_output() {
    let sandbox = Sandbox::new();

    sandbox
        .datebook()
        .args(["new", "--start", "2004-03-02T09:00"])
        .assert()
        .failure();
}

#[test]
fn appended_appointments_are_listed_in_start_order() {
    let sandbox = Sandbox::new();
    let db = sandbox.path("DatebookDB.pdb");

    sandbox.add(&db, "2004-03-05T14:00", Some("15:00"), "Review");
    sandbox.add(&db, "2004-03-02T09:00", Some("10:00"), "Dentist");
    sandbox.add(&db, "2004-03-03", None, "Birthday");

    let output = sandbox
        .datebook()
        .args(["list", "--db"])
        .arg(&db)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let dentist = stdout.find("Dentist").expect("Dentist listed");
    let birthday = stdout.find("Birthday").expect("Birthday listed");
    let review = stdout.find("Review").expect("Review listed");
    assert!(dentist < birthday && birthday < review, "got:\n{}", stdout);
    assert!(stdout.contains("DatebookDB"));
    assert!(stdout.contains("all day"));
}

#[test]
fn show_prints_metadata_and_fields() {
    let sandbox = Sandbox::new();
    let db = sandbox.path("DatebookDB.pdb");
    sandbox.add(&db, "2004-03-02T09:00", Some("10:00"), "Dentist");

    sandbox
        .datebook()
        .args(["show", "0", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(contains("id:         0x000001"))
        .stdout(contains("category:   0 (Unfiled)"))
        .stdout(contains("description=Dentist"));

    sandbox
        .datebook()
        .args(["show", "5", "--db"])
        .arg(&db)
        .assert()
        .failure()
        .stderr(contains("No appointment at index 5"));
}

#[test]
fn export_emits_json() {
    let sandbox = Sandbox::new();
    let db = sandbox.path("DatebookDB.pdb");
    sandbox.add(&db, "2004-03-02T09:00", Some("10:00"), "Dentist");

    let output = sandbox
        .datebook()
        .args(["export", "--db"])
        .arg(&db)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let appointments = json["appointments"].as_array().unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0]["description"], "Dentist");
    assert_eq!(appointments[0]["repeat_type"], "None");
    assert_eq!(json["database"]["name"], "DatebookDB");
}

#[test]
fn missing_database_points_at_config() {
    let sandbox = Sandbox::new();

    sandbox
        .datebook()
        .args(["list", "--db"])
        .arg(sandbox.path("nope.pdb"))
        .assert()
        .failure()
        .stderr(contains("Database not found").and(contains("--db")));
}

#[test]
fn first_run_writes_config_template() {
    let sandbox = Sandbox::new();
    let db = sandbox.path("DatebookDB.pdb");
    sandbox.add(&db, "2004-03-02T09:00", None, "Dentist");

    let config = sandbox.path("config").join("datebook").join("config.toml");
    let text = std::fs::read_to_string(config).unwrap();
    assert!(text.contains("# database ="));
}

#[test]
fn new_keeps_records_list_cannot_show() {
    use chrono::NaiveDate;
    use datebook_core::pdb::{Datebook, PalmDatabase, RawRecord};
    use datebook_core::{RecordAttributes, RecordId};

    let sandbox = Sandbox::new();
    let db = sandbox.path("DatebookDB.pdb");
    let created = NaiveDate::from_ymd_opt(2004, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let mut database = Datebook::new(created).to_database().unwrap();
    database.sort_info = Some(vec![9, 8, 7, 6]);
    database.records = vec![
        RawRecord {
            id: RecordId::new(1).unwrap(),
            attributes: RecordAttributes::from_bits(RecordAttributes::DELETED),
            category: 0,
            data: Vec::new(),
        },
        RawRecord {
            id: RecordId::new(2).unwrap(),
            attributes: RecordAttributes::default(),
            category: 0,
            data: vec![24, 0, 24, 0, 0xc8, 0x61, 0, 0],
        },
        RawRecord {
            id: RecordId::new(3).unwrap(),
            attributes: RecordAttributes::default(),
            category: 0,
            data: vec![9, 30, 10, 15, 0xc8, 0x61, 0, 0],
        },
    ];
    database.write(&db).unwrap();

    sandbox.add(&db, "2004-03-02T09:00", None, "Dentist");

    let reread = PalmDatabase::read(&db).unwrap();
    assert_eq!(reread.records.len(), 4);
    assert_eq!(&reread.records[..3], &database.records[..]);
    assert_eq!(reread.records[3].id.value(), 4);
    assert_eq!(reread.sort_info, Some(vec![9, 8, 7, 6]));
}

#[test]
fn config_sets_default_database() {
    let sandbox = Sandbox::new();
    let db = sandbox.path("DatebookDB.pdb");
    sandbox.add(&db, "2004-03-02T09:00", None, "Dentist");

    sandbox
        .datebook()
        .args(["config", "--database"])
        .arg(&db)
        .assert()
        .success()
        .stdout(contains("Saved"));

    sandbox
        .datebook()
        .arg("config")
        .assert()
        .success()
        .stdout(contains(db.to_string_lossy().into_owned()));

    sandbox
        .datebook()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Dentist"));
}

#[test]
fn unusable_config_dir_falls_back_to_defaults() {
    let sandbox = Sandbox::new();
    let blocker = sandbox.path("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let record = sandbox.path("standup.rec");
    std::fs::write(&record, [9u8, 30, 10, 15, 0xc8, 0x61, 0, 0]).unwrap();

    sandbox
        .datebook()
        .env("XDG_CONFIG_HOME", &blocker)
        .arg("describe")
        .arg(&record)
        .assert()
        .success()
        .stdout(contains("start=2004-03-01 09:30, end=2004-03-01 10:15"))
        .stderr(contains("using default configuration"));
}
