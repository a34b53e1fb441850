use beid_core::{
    AppletCall, Card, CardReader, ReadError, ReaderConfig, Sex, SnapshotApplet, SnapshotHost,
};
use std::cell::RefCell;
use std::rc::Rc;

const SNAPSHOT: &str = r#"readers:
  - ACS ACR38U 00 00
  - Gemalto PC Twin Reader
card:
  reader: Gemalto PC Twin Reader
  fields:
    card_number: 591234567890
    chip_number: 534C4750
    validity_date_begin: 15.01.2010
    validity_date_end: 15.01.2015
    surname: Peeters
    first_name: An
    birth_date: 02 MAR 1980
    sex: V
    document_type: 1
    special_status: 4
    zip: 9000
"#;

fn write_snapshot(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("card.yaml");
    std::fs::write(&path, SNAPSHOT).expect("write snapshot");
    path
}

#[test]
fn reads_card_from_snapshot_file_on_configured_reader() {
    let dir = tempfile::tempdir().expect("tempdir");
    let applet = SnapshotApplet::load(write_snapshot(&dir)).expect("load snapshot");

    let config =
        ReaderConfig::new(Some("Gemalto PC Twin Reader".into()), "cardLauncher").expect("config");
    let mut host = SnapshotHost::new();
    host.insert("cardLauncher", applet);
    let mut reader = CardReader::with_config(host, &config);

    let card = reader.try_read().expect("card should be read");
    let Card::Eid(eid) = &card else {
        panic!("expected an eID card, got {card:?}");
    };
    assert_eq!(eid.surname(), "Peeters");
    assert_eq!(card.sex(), Sex::Female);
    assert_eq!(eid.birth_date(), chrono::NaiveDate::from_ymd_opt(1980, 3, 2));
    assert!(eid.yellow_cane());
    assert!(!eid.white_cane());
    assert!(!eid.extended_minority());
    assert_eq!(eid.zip_code(), 9000);
    assert_eq!(card.card_number(), 591234567890);

    let text = card.to_string();
    assert!(text.starts_with("eID card"));
    assert!(text.contains("surname: Peeters"));
    assert!(text.contains("No picture available."));

    let json = serde_json::to_value(&card).expect("serialize card");
    assert_eq!(json["kind"], "eid");
    assert_eq!(json["validity_begin_date"], "2010-01-15");
    assert!(json["picture"].is_null());
}

#[test]
fn default_reader_without_card_reports_no_card() {
    let dir = tempfile::tempdir().expect("tempdir");
    let applet = SnapshotApplet::load(write_snapshot(&dir)).expect("load snapshot");
    let mut reader = CardReader::new(SnapshotHost::single(applet), None);

    let no_card = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&no_card);
    reader.set_no_card_present_handler(Some(Box::new(move || *seen.borrow_mut() += 1)));

    assert!(reader.read().is_none());
    assert_eq!(*no_card.borrow(), 1);
    assert_eq!(reader.reader_name(), "ACS ACR38U 00 00");

    assert!(matches!(reader.try_read(), Err(ReadError::NoCard(name)) if name == "ACS ACR38U 00 00"));
    assert_eq!(*no_card.borrow(), 1);

    let applet = reader.applet().expect("cached applet");
    assert_eq!(applet.count(AppletCall::InitLib), applet.count(AppletCall::ExitLib) * 2);
    assert_eq!(applet.count(AppletCall::Field), 0);
}
