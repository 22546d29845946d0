//! DAO behavior over a scripted transport: envelope tolerance, relation
//! fallbacks, update field preservation and error messages.

mod common;

use std::sync::Arc;

use common::{client, ScriptedTransport};
use enrollment_core::{ApiError, CourseUnit, Enrollee, HttpMethod, Student, Track};
use serde_json::json;

fn student_json() -> serde_json::Value {
    json!({
        "ID": 11,
        "nom": "Bernard",
        "prenom": "Hugo",
        "email": "hugo@example.org",
        "parcours": {"ID": 2, "NomParcours": "Informatique", "AnneeFormation": 2023}
    })
}

fn hugo() -> Student {
    Student::new("Bernard", "Hugo", "hugo@example.org", Some(Track::stub(2)))
}

// ---------------------------------------------------------------------------
// Envelope vs bare
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_envelope_and_bare_map_the_same() {
    let enveloped = json!({"message": "Étudiant créé", "etudiant": student_json()}).to_string();
    let bare = student_json().to_string();
    let transport = Arc::new(
        ScriptedTransport::default()
            .reply(201, &enveloped)
            .reply(201, &bare),
    );
    let api = client(&transport);

    let a = api.students().create(&hugo()).await.unwrap();
    let b = api.students().create(&hugo()).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.id, Some(11));
    assert_eq!(
        a.track.as_ref().and_then(|t| t.name.as_deref()),
        Some("Informatique")
    );
}

#[tokio::test]
async fn update_envelope_and_bare_map_the_same() {
    let enveloped = json!({"message": "Étudiant modifié", "etudiant": student_json()}).to_string();
    let bare = student_json().to_string();
    let transport = Arc::new(
        ScriptedTransport::default()
            .reply(200, &enveloped)
            .reply(200, &bare),
    );
    let api = client(&transport);

    let a = api.students().update(11, &hugo()).await.unwrap();
    let b = api.students().update(11, &hugo()).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn no_content_writes_succeed_with_caller_values() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .reply(204, "")
            .reply(204, "")
            .reply(204, "")
            .reply(201, ""),
    );
    let api = client(&transport);

    let student = api.students().update(11, &hugo()).await.unwrap();
    assert_eq!(student, Student { id: Some(11), ..hugo() });

    let track = api.tracks().update(2, &Track::new("Informatique", 2023)).await.unwrap();
    assert_eq!(track.id, Some(2));
    assert_eq!(track.name.as_deref(), Some("Informatique"));

    let unit = api.units().update(4, &CourseUnit::new("Réseaux", 204)).await.unwrap();
    assert_eq!(unit.id, Some(4));
    assert_eq!(unit.code, Some(204));

    let created = api.students().create(&hugo()).await.unwrap();
    assert_eq!(created.track, Some(Track::stub(2)));
}

// ---------------------------------------------------------------------------
// Relation fallbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_keeps_caller_track_when_response_omits_it() {
    let body = json!({"message": "ok", "etudiant": {"ID": 11, "nom": "Bernard", "prenom": "Hugo", "email": "hugo@example.org"}});
    let transport = Arc::new(ScriptedTransport::default().reply(200, &body.to_string()));
    let api = client(&transport);

    let sent = Student::new("Bernard", "Hugo", "hugo@example.org", Some(Track::stub(7)));
    let student = api.students().update(11, &sent).await.unwrap();
    assert_eq!(student.track, Some(Track::stub(7)));
}

#[tokio::test]
async fn foreign_key_becomes_track_stub() {
    let body = json!({"ID": 11, "nom": "Bernard", "parcours_id": 3});
    let transport = Arc::new(ScriptedTransport::default().reply(201, &body.to_string()));
    let api = client(&transport);

    let student = api.students().create(&hugo()).await.unwrap();
    assert_eq!(student.track, Some(Track::stub(3)));
}

#[tokio::test]
async fn repeated_partial_updates_never_regress() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .reply(200, r#"{"email":"h.bernard@example.org"}"#)
            .reply(200, r#"{"prenom":"Hugues"}"#),
    );
    let api = client(&transport);

    let first = api.students().update(11, &hugo()).await.unwrap();
    let second = api.students().update(11, &first).await.unwrap();
    assert_eq!(second.id, Some(11));
    assert_eq!(second.last_name.as_deref(), Some("Bernard"));
    assert_eq!(second.first_name.as_deref(), Some("Hugues"));
    assert_eq!(second.email.as_deref(), Some("h.bernard@example.org"));
    assert_eq!(second.track, Some(Track::stub(2)));
}

// ---------------------------------------------------------------------------
// Requests on the wire
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_request_carries_exact_payload() {
    let transport = Arc::new(ScriptedTransport::default().reply(201, &student_json().to_string()));
    let api = client(&transport);

    api.students().create(&hugo()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "http://localhost:8000/api/etudiants");
    let body: serde_json::Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"nom": "Bernard", "prenom": "Hugo", "email": "hugo@example.org", "parcours_id": 2})
    );
}

#[tokio::test]
async fn set_tracks_sends_id_list() {
    let transport = Arc::new(ScriptedTransport::default().reply(204, ""));
    let api = client(&transport);

    api.units().set_tracks(4, &[1, 3]).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Put);
    assert_eq!(requests[0].url, "http://localhost:8000/api/Ues/4/parcours");
    let body: serde_json::Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"parcoursIds": [1, 3]}));
}

// ---------------------------------------------------------------------------
// Delete and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_success_returns_unit() {
    let transport = Arc::new(ScriptedTransport::default().reply(204, ""));
    let api = client(&transport);

    api.students().delete(11).await.unwrap();
    assert_eq!(transport.requests()[0].method, HttpMethod::Delete);
    assert_eq!(transport.requests()[0].url, "http://localhost:8000/api/etudiants/11");
}

#[tokio::test]
async fn delete_error_message_is_backend_error_field() {
    let transport = Arc::new(ScriptedTransport::default().reply(400, r#"{"error":"X"}"#));
    let api = client(&transport);

    let err = api.students().delete(11).await.unwrap_err();
    assert_eq!(err.to_string(), "X");
}

#[tokio::test]
async fn transport_failure_uses_operation_fallback() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .fail(ApiError::Transport("connection refused".to_string()))
            .fail(ApiError::Timeout),
    );
    let api = client(&transport);

    let err = api.tracks().delete(3).await.unwrap_err();
    assert_eq!(err.to_string(), "Impossible de supprimer le parcours");

    let err = api.units().update(4, &CourseUnit::new("Compilation", 402)).await.unwrap_err();
    assert_eq!(err.to_string(), "Impossible de modifier l'UE");
    assert!(matches!(err.cause(), ApiError::Timeout));
}

// ---------------------------------------------------------------------------
// Track enrollments and unit tracks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enrollees_array_is_returned_unchanged() {
    let rows = json!([
        {"ID": 1, "nom": "Durand", "prenom": "Alice", "email": "alice@example.org"},
        {"ID": 2, "nom": "Petit", "prenom": "Marc", "email": "marc@example.org"}
    ]);
    let body = json!({"ID": 3, "NomParcours": "MIAGE", "AnneeFormation": 2024, "inscrits": rows.clone()});
    let transport = Arc::new(
        ScriptedTransport::default()
            .reply(200, &body.to_string())
            .reply(200, r#"{"ID":3,"NomParcours":"MIAGE"}"#),
    );
    let api = client(&transport);

    let expected: Vec<Enrollee> = serde_json::from_value(rows).unwrap();
    assert_eq!(api.tracks().enrollees(3).await.unwrap(), expected);
    assert!(api.tracks().enrollees(3).await.unwrap().is_empty());
    assert_eq!(transport.requests()[0].url, "http://localhost:8000/api/Parcours/3/inscrits");
}

#[tokio::test]
async fn unit_tracks_are_listed() {
    let body = json!([
        {"ID": 1, "NomParcours": "MIAGE", "AnneeFormation": 2024},
        {"ID": 2, "NomParcours": "Informatique", "AnneeFormation": 2023}
    ]);
    let transport = Arc::new(ScriptedTransport::default().reply(200, &body.to_string()));
    let api = client(&transport);

    let tracks = api.units().tracks(4).await.unwrap();
    assert_eq!(tracks.iter().filter_map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(transport.requests()[0].method, HttpMethod::Get);
}

#[tokio::test]
async fn unit_update_preserves_title_and_tracks() {
    let mut sent = CourseUnit::new("Compilation", 402);
    sent.set_tracks(vec![Track::stub(1)]);
    let transport = Arc::new(ScriptedTransport::default().reply(200, r#"{"NumeroUe":403}"#));
    let api = client(&transport);

    let unit = api.units().update(4, &sent).await.unwrap();
    assert_eq!(unit.id, Some(4));
    assert_eq!(unit.title.as_deref(), Some("Compilation"));
    assert_eq!(unit.code, Some(403));
    assert_eq!(unit.tracks, vec![Track::stub(1)]);
}

#[tokio::test]
async fn get_not_found_is_reported() {
    let transport = Arc::new(ScriptedTransport::default().reply(404, r#"{"message":"UE introuvable"}"#));
    let api = client(&transport);

    let err = api.units().get(99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "UE introuvable");
}
