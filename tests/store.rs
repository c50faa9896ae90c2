//! Integration tests for the document store and the typed decode boundary.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tennis_doubles_web::store::{
    decode, encode, fetch_all, insert_record, list_as, Document, Fields, RepositoryError,
};
use tennis_doubles_web::{Collection, InMemoryRepository, Player, Repository, Team};

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn collection_paths_are_namespaced() {
    assert_eq!(
        Collection::Teams.path("artifacts/my-app"),
        "artifacts/my-app/public/data/teams"
    );
    assert_eq!(
        Collection::SubstitutePlayers.path("artifacts/my-app/"),
        "artifacts/my-app/public/data/substitutePlayers"
    );
    assert_eq!(Collection::Matches.path(""), "public/data/matches");
}

#[test]
fn namespaces_do_not_share_data() {
    let repo_a = InMemoryRepository::new("artifacts/a");
    let repo_b = InMemoryRepository::new("artifacts/b");
    insert_record(&repo_a, Player::new("Ann", 3.0)).unwrap();
    assert_eq!(repo_a.list(Collection::Players).unwrap().len(), 1);
    assert!(repo_b.list(Collection::Players).unwrap().is_empty());
}

#[test]
fn insert_assigns_ids_and_roundtrips_entities() {
    let repo = InMemoryRepository::new("artifacts/test");
    let ann = insert_record(&repo, Player::new("Ann", 3.5)).unwrap();
    let bob = insert_record(&repo, Player::new("Bob", 7.0)).unwrap();
    assert!(!ann.id.is_empty());
    assert_ne!(ann.id, bob.id);

    let stored: Vec<Player> = fetch_all(&repo).unwrap();
    assert_eq!(stored, vec![ann, bob]);
}

#[test]
fn team_handicap_sum_is_stored_as_team_handicap_sum() {
    let p1 = Player::new("Ann", 2.0).with_id("p1");
    let p2 = Player::new("Bob", 9.0).with_id("p2");
    let encoded = encode(Collection::Teams, &Team::from_players("Team A", &p1, &p2)).unwrap();
    assert_eq!(encoded.get("teamHandicapSum"), Some(&json!(11.0)));
    assert_eq!(encoded.get("player1Id"), Some(&json!("p1")));
    assert!(!encoded.contains_key("id"));
}

#[test]
fn update_merges_fields_and_delete_removes() {
    let repo = InMemoryRepository::new("artifacts/test");
    let id = repo
        .insert(Collection::Players, fields(json!({ "name": "Ann", "handicap": 3.0 })))
        .unwrap();
    repo.update(Collection::Players, &id, fields(json!({ "handicap": 4.5 })))
        .unwrap();
    let players: Vec<Player> = list_as(&repo, Collection::Players).unwrap();
    assert_eq!(players[0].name, "Ann");
    assert_eq!(players[0].handicap, 4.5);

    repo.delete(Collection::Players, &id).unwrap();
    assert!(repo.list(Collection::Players).unwrap().is_empty());
}

#[test]
fn writes_to_missing_documents_fail() {
    let repo = InMemoryRepository::new("artifacts/test");
    assert!(matches!(
        repo.update(Collection::Matches, "nope", Fields::new()),
        Err(RepositoryError::DocumentNotFound { collection: Collection::Matches, .. })
    ));
    assert!(matches!(
        repo.delete(Collection::Teams, "nope"),
        Err(RepositoryError::DocumentNotFound { .. })
    ));
}

#[test]
fn malformed_documents_are_rejected() {
    let repo = InMemoryRepository::new("artifacts/test");
    repo.insert(Collection::Players, fields(json!({ "name": "Ann", "handicap": "low" })))
        .unwrap();
    let err = fetch_all::<Player>(&repo).unwrap_err();
    match err {
        RepositoryError::Malformed { collection, id, .. } => {
            assert_eq!(collection, Collection::Players);
            assert!(!id.is_empty());
        }
        other => panic!("unexpected error {other:?}"),
    }

    let doc = Document {
        id: "t1".into(),
        created_at: chrono::Utc::now(),
        fields: fields(json!({ "name": "Team A" })),
    };
    assert!(decode::<Team>(Collection::Teams, &doc).is_err());
}

#[test]
fn decode_injects_the_document_id() {
    let doc = Document {
        id: "abc".into(),
        created_at: chrono::Utc::now(),
        fields: fields(json!({ "name": "Ann", "handicap": 3.0, "enteredBy": "admin" })),
    };
    let player: Player = decode(Collection::Players, &doc).unwrap();
    assert_eq!(player.id, "abc");
    assert_eq!(player.entered_by, "admin");
}

#[test]
fn subscribers_see_current_state_then_every_change() {
    let repo = InMemoryRepository::new("artifacts/test");
    insert_record(&repo, Player::new("Ann", 3.0)).unwrap();

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let sub = repo
        .subscribe(
            Collection::Players,
            Box::new(move |docs: &[Document]| sink.lock().unwrap().push(docs.len())),
        )
        .unwrap();

    let bob = insert_record(&repo, Player::new("Bob", 5.0)).unwrap();
    repo.delete(Collection::Players, &bob.id).unwrap();
    // Writes to other collections are not delivered.
    insert_record(&repo, Team::from_players("Team A", &Player::new("x", 1.0), &Player::new("y", 2.0))).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);

    sub.unsubscribe();
    insert_record(&repo, Player::new("Cy", 1.0)).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn dropping_a_subscription_stops_notifications() {
    let repo = InMemoryRepository::new("artifacts/test");
    let calls = Arc::new(Mutex::new(0));
    let sink = calls.clone();
    {
        let _sub = repo
            .subscribe(
                Collection::Players,
                Box::new(move |_: &[Document]| *sink.lock().unwrap() += 1),
            )
            .unwrap();
        insert_record(&repo, Player::new("Ann", 3.0)).unwrap();
    }
    insert_record(&repo, Player::new("Bob", 4.0)).unwrap();
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[test]
fn clones_share_the_same_data() {
    let repo = InMemoryRepository::new("artifacts/test");
    let other = repo.clone();
    insert_record(&other, Player::new("Ann", 3.0)).unwrap();
    assert_eq!(repo.list(Collection::Players).unwrap().len(), 1);
    assert_eq!(repo.namespace(), "artifacts/test");
}
