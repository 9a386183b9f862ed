use std::rc::Rc;

use bridaldesk_core::{
    CoreError, EntityKey, FieldValue, ItemId, ManualClock, PaymentStatus, StorageKey, decode_items,
    snapshot,
};
use bridaldesk_engine::{Desk, EngineConfig, EngineError, TracingNotifier};
use bridaldesk_harness::{RecordingNotifier, TestDesk, TestTabs, init_tracing};
use bridaldesk_storage::{
    Collection, CollectionStore, KeyedStore, MemoryStore, SqliteStore, StorageError,
};

// ============================================================================
// Detail autosave
// ============================================================================

#[test]
fn detail_field_lands_in_store_after_quiet_period() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let t = TestDesk::new();
    let mut session = t.open(42, "detail")?;
    session.set("readyDekorasi", "2024-06-01")?;
    t.advance(1_000);
    session.poll();

    let key = StorageKey::new("detail", &EntityKey::Int(42))?;
    let stored = t.store.read(&key)?.unwrap();
    assert_eq!(stored["readyDekorasi"], FieldValue::text("2024-06-01"));
    // Every other default field is written along with it.
    assert_eq!(stored["readyMakeup"], FieldValue::text(""));
    assert_eq!(stored["lokasiAcara"], FieldValue::text(""));
    Ok(())
}

#[test]
fn reopening_hydrates_from_last_write() -> Result<(), Box<dyn std::error::Error>> {
    let t = TestDesk::new();
    let mut session = t.open("client-9", "fitting")?;
    session.set("lingkarDada", "90")?;
    t.settle(&mut session);
    session.close();

    let session = t.open("client-9", "fitting")?;
    assert_eq!(session.get("lingkarDada"), Some(&FieldValue::text("90")));
    assert_eq!(session.key().as_str(), "fitting-client-9");
    Ok(())
}

#[test]
fn text_entity_id_cannot_reach_a_longer_group_key() -> Result<(), Box<dyn std::error::Error>> {
    let t = TestDesk::new();
    let mut photos = t.open(42, "fitting-photos")?;
    assert_eq!(photos.key().as_str(), "fitting-photos-42");
    photos.append_item("photos", snapshot([("image", "data:image/png;base64,AAAA")]))?;

    let err = t.desk.open("photos-42", "fitting");
    assert!(matches!(err, Err(EngineError::Core(CoreError::InvalidKey(_)))));
    assert!(matches!(
        t.desk.discard("photos-42", "fitting"),
        Err(EngineError::Core(CoreError::InvalidKey(_)))
    ));
    let stored = t.stored("fitting-photos", 42)?.unwrap();
    assert_eq!(decode_items(&stored["photos"])?.len(), 1);

    // Hyphenated ids that do not spell another group are fine.
    let session = t.open("client-9", "fitting")?;
    assert_eq!(session.key().as_str(), "fitting-client-9");
    Ok(())
}

// ============================================================================
// Invoice payments
// ============================================================================

#[test]
fn second_payment_settles_invoice_and_persists_at_once() -> Result<(), Box<dyn std::error::Error>> {
    let t = TestDesk::new();
    t.seed(
        "invoice",
        42,
        &snapshot([
            ("totalDue", FieldValue::Integer(15_000_000)),
            ("payments", seeded_payments()),
        ]),
    )?;

    let mut session = t.open(42, "invoice")?;
    let before = session.summary().unwrap();
    assert_eq!(before.total_paid, 5_000_000);
    assert_eq!(before.status, PaymentStatus::Unpaid);

    let change = session.append_item(
        "payments",
        snapshot([
            ("jumlah", FieldValue::Integer(10_000_000)),
            ("tanggal", FieldValue::text("2024-05-20")),
            ("metode", FieldValue::text("transfer")),
        ]),
    )?;
    assert!(change.persisted);
    let ids: Vec<u64> = change.items.iter().map(|i| i.id.get()).collect();
    assert_eq!(ids, vec![1, 2]);

    let summary = session.summary().unwrap();
    assert_eq!(summary.total_paid, 15_000_000);
    assert_eq!(summary.remaining, 0);
    assert_eq!(summary.status, PaymentStatus::Paid);

    // Written without advancing the clock.
    let stored = t.stored("invoice", 42)?.unwrap();
    let items = decode_items(&stored["payments"])?;
    assert_eq!(items[1].id, ItemId::new(2));
    assert_eq!(items[1].get("jumlah"), Some(&FieldValue::Integer(10_000_000)));
    assert_eq!(stored["status"], FieldValue::text("Paid"));
    assert_eq!(stored["remaining"], FieldValue::Integer(0));
    Ok(())
}

fn seeded_payments() -> FieldValue {
    FieldValue::List(vec![FieldValue::Map(snapshot([
        ("id", FieldValue::Integer(1)),
        ("jumlah", FieldValue::Integer(5_000_000)),
        ("tanggal", FieldValue::text("2024-01-10")),
        ("metode", FieldValue::text("cash")),
    ]))])
}

// ============================================================================
// Concurrent tabs
// ============================================================================

#[test]
fn second_tab_overwrites_first_without_merge() -> Result<(), Box<dyn std::error::Error>> {
    let mut tabs = TestTabs::new();
    let a = tabs.add_tab();
    let b = tabs.add_tab();

    let mut first = tabs.tab(a).open(42, "detail")?;
    let mut second = tabs.tab(b).open(42, "detail")?;

    first.set("catatan", "dari tab A")?;
    first.set("lokasiAcara", "Gedung A")?;
    tabs.tab(a).settle(&mut first);

    second.set("catatan", "dari tab B")?;
    tabs.tab(b).settle(&mut second);

    let key = StorageKey::new("detail", &EntityKey::Int(42))?;
    let stored = tabs.store().read(&key)?.unwrap();
    assert_eq!(stored["catatan"], FieldValue::text("dari tab B"));
    // Tab B never saw tab A's location, so its full snapshot erased it.
    assert_eq!(stored["lokasiAcara"], FieldValue::text(""));
    Ok(())
}

// ============================================================================
// SQLite-backed desk
// ============================================================================

#[test]
fn sqlite_desk_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("desk.db");
    let path = path.to_str().ok_or("non-utf8 temp path")?;

    let clock = Rc::new(ManualClock::new(0));
    {
        let store = Rc::new(SqliteStore::open(path)?);
        let client = store.add_record(Collection::Clients, &snapshot([("nama", "Sari & Dimas")]))?;
        let desk = Desk::new(store.clone(), clock.clone(), Rc::new(TracingNotifier), EngineConfig::default())
            .with_collections(store.clone());
        let mut session = desk.open_for_record(Collection::Clients, client, "detail")?;
        session.set("tanggalAcara", "2024-08-17")?;
        clock.advance(1_000);
        assert!(session.poll().unwrap().is_saved());
    }

    let store = Rc::new(SqliteStore::open(path)?);
    let desk = Desk::new(store.clone(), clock.clone(), Rc::new(TracingNotifier), EngineConfig::default())
        .with_collections(store.clone());
    let session = desk.open_for_record(Collection::Clients, 1, "detail")?;
    assert_eq!(session.get("tanggalAcara"), Some(&FieldValue::text("2024-08-17")));

    // Drafts never leak into the backend record.
    let record = store.get_record(Collection::Clients, 1)?.unwrap();
    assert!(!record.body.contains_key("tanggalAcara"));
    Ok(())
}

#[test]
fn missing_record_is_a_page_level_error() -> Result<(), Box<dyn std::error::Error>> {
    let store = Rc::new(SqliteStore::open_in_memory()?);
    let desk = Desk::new(
        store.clone(),
        Rc::new(ManualClock::new(0)),
        Rc::new(RecordingNotifier::new()),
        EngineConfig::default(),
    )
    .with_collections(store.clone());

    let err = desk.open_for_record(Collection::TeamMembers, 404, "detail");
    assert!(matches!(err, Err(EngineError::EntityNotFound(_))));

    let bare = Desk::new(
        store.clone(),
        Rc::new(ManualClock::new(0)),
        Rc::new(RecordingNotifier::new()),
        EngineConfig::default(),
    );
    assert!(matches!(
        bare.open_for_record(Collection::Clients, 1, "detail"),
        Err(EngineError::EntityNotFound(_))
    ));
    assert!(matches!(bare.open(1, "no-such-group"), Err(EngineError::UnknownGroup(_))));
    Ok(())
}

#[test]
fn discard_deletes_stored_draft() -> Result<(), Box<dyn std::error::Error>> {
    let t = TestDesk::new();
    t.seed("clothes-list", 5, &snapshot([("items", FieldValue::List(vec![]))]))?;
    t.desk.discard(5, "clothes-list")?;
    assert!(t.stored("clothes-list", 5)?.is_none());
    Ok(())
}

#[test]
fn desk_from_env_picks_up_tuning() -> Result<(), Box<dyn std::error::Error>> {
    unsafe { std::env::set_var("BRIDALDESK_QUIET_PERIOD_MS", "40") };
    let clock = Rc::new(ManualClock::new(0));
    let desk = Desk::from_env(Rc::new(MemoryStore::new()), clock.clone(), Rc::new(RecordingNotifier::new()));
    unsafe { std::env::remove_var("BRIDALDESK_QUIET_PERIOD_MS") };
    assert_eq!(desk.config().quiet_period_ms, 40);

    let mut session = desk.open(1, "detail")?;
    session.set("catatan", "cepat")?;
    clock.advance(40);
    assert!(session.poll().unwrap().is_saved());
    Ok(())
}

#[test]
fn quota_is_reported_as_storage_error() {
    let t = TestDesk::with_config(EngineConfig::default().with_store_capacity_bytes(10));
    let err = t.seed("detail", 1, &snapshot([("catatan", "terlalu panjang")]));
    assert!(matches!(err, Err(StorageError::QuotaExceeded { capacity: 10, .. })));
}
