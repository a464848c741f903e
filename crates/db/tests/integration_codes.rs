//! Integration-Tests fuer CodeRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use torwache_db::{CodeRepository, NeuerBenutzer, SqliteDb, UserRepository};
use torwache_core::UserId;

async fn db_mit_benutzer() -> (SqliteDb, UserId) {
    let db = SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden");
    let benutzer = db
        .create(NeuerBenutzer {
            email: "code@example.com",
            password_hash: "hash",
        })
        .await
        .unwrap();
    (db, benutzer.id)
}

#[tokio::test]
async fn code_speichern_und_laden() {
    let (db, user_id) = db_mit_benutzer().await;

    let ablauf = Utc::now() + Duration::hours(24);
    let record = db
        .store_verification_code(user_id, "483920", ablauf)
        .await
        .expect("Code speichern fehlgeschlagen");
    assert_eq!(record.code, "483920");
    assert!(record.ist_einloesbar());

    let geladen = db
        .get_valid_code(user_id)
        .await
        .unwrap()
        .expect("Code sollte einloesbar sein");
    assert_eq!(geladen.code, "483920");
}

#[tokio::test]
async fn neuer_code_ersetzt_alten() {
    let (db, user_id) = db_mit_benutzer().await;
    let ablauf = Utc::now() + Duration::hours(24);

    db.store_verification_code(user_id, "111111", ablauf).await.unwrap();
    db.store_verification_code(user_id, "222222", ablauf).await.unwrap();

    // Nur der juengste Code ist einloesbar
    let geladen = db.get_valid_code(user_id).await.unwrap().unwrap();
    assert_eq!(geladen.code, "222222");
}

#[tokio::test]
async fn benutzter_code_nicht_mehr_einloesbar() {
    let (db, user_id) = db_mit_benutzer().await;
    let ablauf = Utc::now() + Duration::hours(24);

    db.store_verification_code(user_id, "333333", ablauf).await.unwrap();
    db.mark_code_used(user_id).await.unwrap();

    assert!(db.get_valid_code(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn abgelaufener_code_wird_gefiltert() {
    let (db, user_id) = db_mit_benutzer().await;

    // Bereits abgelaufen gespeichert; bleibt in der DB stehen, wird aber
    // beim Lesen gefiltert
    let ablauf = Utc::now() - Duration::seconds(1);
    db.store_verification_code(user_id, "444444", ablauf).await.unwrap();

    assert!(db.get_valid_code(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn mark_code_used_ohne_offene_codes_ist_noop() {
    let (db, user_id) = db_mit_benutzer().await;
    db.mark_code_used(user_id).await.expect("No-Op darf nicht fehlschlagen");
}

#[tokio::test]
async fn codes_verschiedener_benutzer_getrennt() {
    let (db, user_a) = db_mit_benutzer().await;
    let benutzer_b = db
        .create(NeuerBenutzer {
            email: "andere@example.com",
            password_hash: "hash",
        })
        .await
        .unwrap();
    let ablauf = Utc::now() + Duration::hours(24);

    db.store_verification_code(user_a, "555555", ablauf).await.unwrap();
    db.store_verification_code(benutzer_b.id, "666666", ablauf).await.unwrap();

    assert_eq!(db.get_valid_code(user_a).await.unwrap().unwrap().code, "555555");
    assert_eq!(
        db.get_valid_code(benutzer_b.id).await.unwrap().unwrap().code,
        "666666"
    );
}
