use chrono::{Local, NaiveDate};
use rollcall::auth::{self, SessionStore};
use rollcall::config::Config;
use rollcall::db::{AttendanceRow, AttendanceStorage, NewParticipant};
use rollcall::error::{AuthFailure, RollcallError};
use rollcall::service::export;
use tempfile::TempDir;

async fn fresh_storage() -> (TempDir, AttendanceStorage, Config) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let database_url = format!("sqlite:{}", dir.path().join("rollcall.db").display());
    let storage = AttendanceStorage::connect(&database_url)
        .await
        .expect("failed to open store");
    let cfg = Config::default();
    storage
        .ensure_schema(&cfg.admin, &cfg.default_events)
        .await
        .expect("failed to init schema");
    (dir, storage, cfg)
}

fn participant(name: &str, district: Option<&str>) -> NewParticipant {
    NewParticipant {
        name: name.to_string(),
        district: district.map(str::to_string),
        contact: None,
    }
}

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("bad test date")
}

async fn event_id(storage: &AttendanceStorage, name: &str) -> i64 {
    storage
        .list_events()
        .await
        .expect("list events")
        .into_iter()
        .find(|e| e.name == name)
        .map(|e| e.id)
        .expect("seeded event missing")
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let (_dir, storage, cfg) = fresh_storage().await;

    let again = storage
        .ensure_schema(&cfg.admin, &cfg.default_events)
        .await
        .expect("second init");
    assert!(!again.admin_created);
    assert_eq!(again.events_created, 0);

    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(storage.pool())
        .await
        .expect("count users");
    assert_eq!(users, 1);

    let counts = storage.counts().await.expect("counts");
    assert_eq!(counts.events, 6);
    assert_eq!(counts.participants, 0);
    assert_eq!(counts.attendance, 0);
}

#[tokio::test]
async fn first_bootstrap_reports_what_it_seeded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = format!("sqlite:{}", dir.path().join("seed.db").display());
    let storage = AttendanceStorage::connect(&database_url).await.expect("open");
    let cfg = Config::default();

    let report = storage
        .ensure_schema(&cfg.admin, &cfg.default_events)
        .await
        .expect("init");
    assert!(report.admin_created);
    assert_eq!(report.events_created, 6);

    let admin = storage
        .find_credential("admin")
        .await
        .expect("lookup")
        .expect("admin seeded");
    assert_ne!(admin.password_hash, cfg.admin.password);
    assert!(admin.password_hash.starts_with("$argon2id$"));
    assert!(rollcall::auth::password::verify_password(
        &cfg.admin.password,
        &admin.password_hash
    ));
}

#[tokio::test]
async fn blank_participant_names_are_rejected() {
    let (_dir, storage, _) = fresh_storage().await;

    for name in ["", "   ", "\t\n"] {
        let err = storage
            .create_participant(participant(name, Some("North")))
            .await
            .expect_err("blank name accepted");
        assert!(matches!(err, RollcallError::Validation(_)), "{err:?}");
    }

    assert_eq!(storage.counts().await.expect("counts").participants, 0);
}

#[tokio::test]
async fn district_filter_is_exact_match() {
    let (_dir, storage, _) = fresh_storage().await;

    storage.create_participant(participant("Asha", Some("North"))).await.expect("insert");
    storage.create_participant(participant("  Bo ", Some("North "))).await.expect("insert");
    storage.create_participant(participant("Cy", Some("South"))).await.expect("insert");
    storage.create_participant(participant("Di", Some("  "))).await.expect("insert");

    let north = storage.list_participants(Some("North")).await.expect("list");
    let names: Vec<_> = north.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Asha", "Bo"]);

    assert!(storage.list_participants(Some("Nor")).await.expect("list").is_empty());
    assert_eq!(storage.list_participants(Some("")).await.expect("list").len(), 4);

    let all = storage.list_participants(None).await.expect("list");
    assert_eq!(all.len(), 4);
    assert_eq!(all[3].district, None);
    assert_eq!(all, storage.list_participants(None).await.expect("list"));
}

#[tokio::test]
async fn attendance_requires_existing_participant_and_event() {
    let (_dir, storage, _) = fresh_storage().await;
    let pid = storage.create_participant(participant("Asha", None)).await.expect("insert");
    let eid = event_id(&storage, "Event A").await;

    let err = storage
        .record_attendance(pid + 100, eid, Some(day("2024-01-15")))
        .await
        .expect_err("unknown participant accepted");
    assert!(
        matches!(err, RollcallError::Referential(ref m) if m.contains("Participant")),
        "{err:?}"
    );

    let err = storage
        .record_attendance(pid, 9_999, Some(day("2024-01-15")))
        .await
        .expect_err("unknown event accepted");
    assert!(
        matches!(err, RollcallError::Referential(ref m) if m.contains("Event")),
        "{err:?}"
    );

    assert_eq!(storage.counts().await.expect("counts").attendance, 0);
}

#[tokio::test]
async fn deleting_participant_or_event_cascades_to_attendance() {
    let (_dir, storage, _) = fresh_storage().await;
    let asha = storage.create_participant(participant("Asha", None)).await.expect("insert");
    let bo = storage.create_participant(participant("Bo", None)).await.expect("insert");
    let a = event_id(&storage, "Event A").await;
    let b = event_id(&storage, "Event B").await;

    storage.record_attendance(asha, a, Some(day("2024-01-01"))).await.expect("insert");
    storage.record_attendance(asha, b, Some(day("2024-01-02"))).await.expect("insert");
    storage.record_attendance(bo, b, Some(day("2024-01-03"))).await.expect("insert");

    assert!(storage.get_participant(asha).await.expect("get").is_some());
    assert!(storage.delete_participant(asha).await.expect("delete"));
    assert_eq!(storage.get_participant(asha).await.expect("get"), None);
    let rows = storage.list_attendance().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].participant_name, "Bo");

    assert!(storage.delete_event(b).await.expect("delete"));
    assert_eq!(storage.counts().await.expect("counts").attendance, 0);

    let (orphans,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM attendance a
         LEFT JOIN participants p ON a.participant_id = p.id
         LEFT JOIN events e ON a.event_id = e.id
         WHERE p.id IS NULL OR e.id IS NULL",
    )
    .fetch_one(storage.pool())
    .await
    .expect("orphan query");
    assert_eq!(orphans, 0);

    assert!(!storage.delete_participant(asha).await.expect("delete again"));
}

#[tokio::test]
async fn attendance_is_listed_newest_first_with_stable_ties() {
    let (_dir, storage, _) = fresh_storage().await;
    let eid = event_id(&storage, "Event C").await;

    let inserts = [
        ("P1", "2024-01-10"),
        ("P2", "2024-01-15"),
        ("P3", "2024-01-15"),
        ("P4", "2024-01-12"),
        ("P5", "2024-01-15"),
    ];
    for (name, date) in inserts {
        let pid = storage.create_participant(participant(name, None)).await.expect("insert");
        storage.record_attendance(pid, eid, Some(day(date))).await.expect("record");
    }

    let rows = storage.list_attendance().await.expect("list");
    let order: Vec<_> = rows.iter().map(|r| r.participant_name.as_str()).collect();
    assert_eq!(order, ["P2", "P3", "P5", "P4", "P1"]);
    assert!(rows.windows(2).all(|w| w[0].date >= w[1].date));

    assert_eq!(rows, storage.list_attendance().await.expect("list again"));
}

#[tokio::test]
async fn attendance_date_defaults_to_today() {
    let (_dir, storage, _) = fresh_storage().await;
    let pid = storage.create_participant(participant("Asha", None)).await.expect("insert");
    let eid = event_id(&storage, "Event A").await;

    let before = Local::now().date_naive();
    storage.record_attendance(pid, eid, None).await.expect("record");
    let after = Local::now().date_naive();

    let rows = storage.list_attendance().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert!(rows[0].date == before || rows[0].date == after);
}

#[tokio::test]
async fn events_enforce_unique_names_and_positive_frequency() {
    let (_dir, storage, _) = fresh_storage().await;

    let id = storage.create_event("Choir practice", 4).await.expect("create");
    assert!(id > 0);

    for (name, freq) in [("Event A", 1), ("Choir practice", 2), ("  ", 1), ("Retreat", 0)] {
        let err = storage.create_event(name, freq).await.expect_err("bad event accepted");
        assert!(matches!(err, RollcallError::Validation(_)), "{name}: {err:?}");
    }
    assert_eq!(storage.list_events().await.expect("list").len(), 7);
}

#[tokio::test]
async fn authenticate_checks_the_hashed_password() {
    let (_dir, storage, _) = fresh_storage().await;
    let sessions = SessionStore::new();

    let token = auth::authenticate(&storage, &sessions, "admin", "admin123")
        .await
        .expect("login");
    let session = sessions.require(Some(&token)).await.expect("session");
    assert_eq!(session.username, "admin");

    for (user, pass) in [("admin", "wrong"), ("nobody", "admin123"), ("", "")] {
        let err = auth::authenticate(&storage, &sessions, user, pass)
            .await
            .expect_err("bad login accepted");
        assert!(matches!(err, RollcallError::Auth(AuthFailure::InvalidCredentials)));
    }
    assert_eq!(sessions.len().await, 1);
}

#[tokio::test]
async fn participant_to_export_end_to_end() {
    let (_dir, storage, _) = fresh_storage().await;

    let pid = storage
        .create_participant(participant("Asha", Some("North")))
        .await
        .expect("insert");
    let listed = storage.list_participants(None).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Asha");
    assert_eq!(listed[0].district.as_deref(), Some("North"));

    let eid = event_id(&storage, "Event A").await;
    storage
        .record_attendance(pid, eid, Some(day("2024-01-15")))
        .await
        .expect("record");

    let rows = storage.list_attendance().await.expect("list");
    assert_eq!(
        rows,
        vec![AttendanceRow {
            participant_name: "Asha".to_string(),
            district: Some("North".to_string()),
            event_name: "Event A".to_string(),
            date: day("2024-01-15"),
        }]
    );

    let artifact = export::export_attendance(&storage).await.expect("export");
    assert_eq!(artifact.rows, 1);
    assert!(artifact.filename.starts_with("attendance_"));
    let text = String::from_utf8(artifact.bytes).expect("utf-8");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines, ["Name,District,Event,Date", "Asha,North,Event A,2024-01-15"]);
}
