//! In-memory stand-in for the enrollment backend.
//!
//! Reproduces the backend's uneven response shapes on purpose: student writes
//! answer with a `{message, etudiant}` envelope carrying only `parcours_id`
//! (and updates leave the track out entirely), student listings embed the
//! track, tracks and units are bare objects, and errors are `{error}` or
//! `{message}` bodies.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "NomParcours")]
    pub name: String,
    #[serde(rename = "AnneeFormation")]
    pub formation_year: i32,
}

#[derive(Clone, Debug)]
struct StudentRow {
    id: i64,
    last_name: String,
    first_name: String,
    email: String,
    track_id: Option<i64>,
}

#[derive(Clone, Debug)]
struct UnitRow {
    id: i64,
    title: String,
    code: i64,
}

#[derive(Deserialize)]
pub struct StudentInput {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,
    pub parcours_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct TrackInput {
    #[serde(rename = "NomParcours")]
    pub name: Option<String>,
    #[serde(rename = "AnneeFormation")]
    pub formation_year: Option<i32>,
}

#[derive(Deserialize)]
pub struct UnitInput {
    #[serde(rename = "Intitule")]
    pub title: Option<String>,
    #[serde(rename = "NumeroUe")]
    pub code: Option<i64>,
}

#[derive(Deserialize)]
pub struct UnitTracksInput {
    #[serde(rename = "parcoursIds")]
    pub track_ids: Vec<i64>,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    students: BTreeMap<i64, StudentRow>,
    tracks: BTreeMap<i64, Track>,
    units: BTreeMap<i64, UnitRow>,
    unit_tracks: BTreeMap<i64, BTreeSet<i64>>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn student_json(&self, row: &StudentRow) -> Value {
        let mut value = json!({
            "ID": row.id,
            "nom": row.last_name,
            "prenom": row.first_name,
            "email": row.email,
        });
        match row.track_id.and_then(|id| self.tracks.get(&id)) {
            Some(track) => value["parcours"] = json!(track),
            None => value["parcours_id"] = json!(row.track_id),
        }
        value
    }

    fn unit_json(&self, row: &UnitRow) -> Value {
        json!({
            "ID": row.id,
            "Intitule": row.title,
            "NumeroUe": row.code,
            "Parcours": self.tracks_of_unit(row.id),
        })
    }

    fn tracks_of_unit(&self, unit_id: i64) -> Vec<Track> {
        self.unit_tracks
            .get(&unit_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.tracks.get(id).cloned())
            .collect()
    }

    fn check_track(&self, track_id: Option<i64>) -> Result<(), Failure> {
        match track_id {
            Some(id) if !self.tracks.contains_key(&id) => {
                Err(Failure::error(StatusCode::BAD_REQUEST, "Parcours introuvable"))
            }
            _ => Ok(()),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error reply, shaped the way the backend shapes it.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    body: Value,
}

impl Failure {
    fn error(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            body: json!({ "error": msg }),
        }
    }

    fn message(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            body: json!({ "message": msg }),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type Reply = Result<(StatusCode, Json<Value>), Failure>;

fn required(value: Option<String>, msg: &str) -> Result<String, Failure> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Failure::error(StatusCode::BAD_REQUEST, msg))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/etudiants", get(list_students).post(create_student))
        .route(
            "/api/etudiants/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/api/Parcours", get(list_tracks).post(create_track))
        .route(
            "/api/Parcours/{id}",
            get(get_track).put(update_track).delete(delete_track),
        )
        .route("/api/Parcours/{id}/inscrits", get(track_enrollees))
        .route("/api/Ue", get(list_units).post(create_unit))
        .route(
            "/api/Ue/{id}",
            get(get_unit).put(update_unit).delete(delete_unit),
        )
        .route(
            "/api/Ues/{id}/parcours",
            get(unit_tracks).put(set_unit_tracks),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// --- students ---

async fn list_students(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(
        store
            .students
            .values()
            .map(|row| store.student_json(row))
            .collect(),
    )
}

async fn get_student(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    let row = store
        .students
        .get(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Étudiant introuvable"))?;
    Ok((StatusCode::OK, Json(store.student_json(row))))
}

async fn create_student(State(db): State<Db>, Json(input): Json<StudentInput>) -> Reply {
    let mut store = db.write().await;
    store.check_track(input.parcours_id)?;
    let last_name = required(input.nom, "Le nom est requis")?;
    let first_name = required(input.prenom, "Le prénom est requis")?;
    let email = required(input.email, "L'email est requis")?;
    let row = StudentRow {
        id: store.allocate_id(),
        last_name,
        first_name,
        email,
        track_id: input.parcours_id,
    };
    let etudiant = json!({
        "ID": row.id,
        "nom": row.last_name,
        "prenom": row.first_name,
        "email": row.email,
        "parcours_id": row.track_id,
    });
    tracing::debug!(id = row.id, "student created");
    store.students.insert(row.id, row);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Étudiant créé", "etudiant": etudiant })),
    ))
}

async fn update_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<StudentInput>,
) -> Reply {
    let mut store = db.write().await;
    store.check_track(input.parcours_id)?;
    let row = store
        .students
        .get_mut(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Étudiant introuvable"))?;
    if let Some(nom) = input.nom {
        row.last_name = nom;
    }
    if let Some(prenom) = input.prenom {
        row.first_name = prenom;
    }
    if let Some(email) = input.email {
        row.email = email;
    }
    row.track_id = input.parcours_id;
    let etudiant = json!({
        "ID": row.id,
        "nom": row.last_name,
        "prenom": row.first_name,
        "email": row.email,
    });
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Étudiant modifié", "etudiant": etudiant })),
    ))
}

async fn delete_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store
        .students
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Étudiant introuvable"))
}

// --- tracks ---

async fn list_tracks(State(db): State<Db>) -> Json<Vec<Track>> {
    let store = db.read().await;
    Json(store.tracks.values().cloned().collect())
}

async fn get_track(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Track>, Failure> {
    let store = db.read().await;
    store
        .tracks
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Parcours introuvable"))
}

async fn create_track(
    State(db): State<Db>,
    Json(input): Json<TrackInput>,
) -> Result<(StatusCode, Json<Track>), Failure> {
    let mut store = db.write().await;
    let name = required(input.name, "Le nom du parcours est requis")?;
    let formation_year = input
        .formation_year
        .ok_or_else(|| Failure::error(StatusCode::BAD_REQUEST, "L'année de formation est requise"))?;
    let track = Track {
        id: store.allocate_id(),
        name,
        formation_year,
    };
    store.tracks.insert(track.id, track.clone());
    Ok((StatusCode::CREATED, Json(track)))
}

async fn update_track(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<TrackInput>,
) -> Result<Json<Track>, Failure> {
    let mut store = db.write().await;
    let track = store
        .tracks
        .get_mut(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Parcours introuvable"))?;
    if let Some(name) = input.name {
        track.name = name;
    }
    if let Some(year) = input.formation_year {
        track.formation_year = year;
    }
    Ok(Json(track.clone()))
}

async fn delete_track(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    if !store.tracks.contains_key(&id) {
        return Err(Failure::error(StatusCode::NOT_FOUND, "Parcours introuvable"));
    }
    if store.students.values().any(|s| s.track_id == Some(id)) {
        return Err(Failure::message(
            StatusCode::CONFLICT,
            "Des étudiants sont inscrits dans ce parcours",
        ));
    }
    store.tracks.remove(&id);
    for tracks in store.unit_tracks.values_mut() {
        tracks.remove(&id);
    }
    tracing::debug!(id, "track deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn track_enrollees(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    let track = store
        .tracks
        .get(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Parcours introuvable"))?;
    let enrolled: Vec<Value> = store
        .students
        .values()
        .filter(|s| s.track_id == Some(id))
        .map(|s| json!({"ID": s.id, "nom": s.last_name, "prenom": s.first_name, "email": s.email}))
        .collect();
    let mut body = json!(track);
    body["inscrits"] = json!(enrolled);
    Ok((StatusCode::OK, Json(body)))
}

// --- course units ---

async fn list_units(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(store.units.values().map(|row| store.unit_json(row)).collect())
}

async fn get_unit(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    let row = store
        .units
        .get(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "UE introuvable"))?;
    Ok((StatusCode::OK, Json(store.unit_json(row))))
}

async fn create_unit(State(db): State<Db>, Json(input): Json<UnitInput>) -> Reply {
    let mut store = db.write().await;
    let code = input
        .code
        .ok_or_else(|| Failure::error(StatusCode::BAD_REQUEST, "Le numéro d'UE est requis"))?;
    if store.units.values().any(|u| u.code == code) {
        return Err(Failure::error(StatusCode::CONFLICT, "Ce numéro d'UE existe déjà"));
    }
    let title = required(input.title, "L'intitulé est requis")?;
    let row = UnitRow {
        id: store.allocate_id(),
        title,
        code,
    };
    let body = store.unit_json(&row);
    store.units.insert(row.id, row);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_unit(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UnitInput>,
) -> Reply {
    let mut store = db.write().await;
    let row = store
        .units
        .get_mut(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "UE introuvable"))?;
    if let Some(title) = input.title {
        row.title = title;
    }
    if let Some(code) = input.code {
        row.code = code;
    }
    let row = row.clone();
    Ok((StatusCode::OK, Json(store.unit_json(&row))))
}

async fn delete_unit(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store.unit_tracks.remove(&id);
    store
        .units
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "UE introuvable"))
}

async fn unit_tracks(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Track>>, Failure> {
    let store = db.read().await;
    if !store.units.contains_key(&id) {
        return Err(Failure::error(StatusCode::NOT_FOUND, "UE introuvable"));
    }
    Ok(Json(store.tracks_of_unit(id)))
}

async fn set_unit_tracks(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UnitTracksInput>,
) -> Reply {
    let mut store = db.write().await;
    if !store.units.contains_key(&id) {
        return Err(Failure::error(StatusCode::NOT_FOUND, "UE introuvable"));
    }
    if let Some(missing) = input.track_ids.iter().find(|t| !store.tracks.contains_key(*t)) {
        return Err(Failure::error(
            StatusCode::BAD_REQUEST,
            &format!("Parcours {missing} introuvable"),
        ));
    }
    store
        .unit_tracks
        .insert(id, input.track_ids.into_iter().collect());
    Ok((StatusCode::OK, Json(json!({ "message": "Parcours de l'UE mis à jour" }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(track_id: Option<i64>) -> StudentRow {
        StudentRow {
            id: 1,
            last_name: "Durand".to_string(),
            first_name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            track_id,
        }
    }

    #[test]
    fn student_embeds_known_track() {
        let mut store = Store::default();
        store.tracks.insert(
            7,
            Track {
                id: 7,
                name: "MIAGE".to_string(),
                formation_year: 2024,
            },
        );
        let json = store.student_json(&row(Some(7)));
        assert_eq!(json["parcours"]["NomParcours"], "MIAGE");
        assert!(json.get("parcours_id").is_none());
    }

    #[test]
    fn student_falls_back_to_foreign_key() {
        let store = Store::default();
        let json = store.student_json(&row(Some(9)));
        assert_eq!(json["parcours_id"], 9);
        assert!(json.get("parcours").is_none());
    }

    #[test]
    fn track_serializes_with_backend_keys() {
        let track = Track {
            id: 1,
            name: "Info".to_string(),
            formation_year: 2023,
        };
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json, json!({"ID": 1, "NomParcours": "Info", "AnneeFormation": 2023}));
    }

    #[test]
    fn student_input_fields_optional() {
        let input: StudentInput = serde_json::from_str(r#"{"nom":"Durand"}"#).unwrap();
        assert_eq!(input.nom.as_deref(), Some("Durand"));
        assert!(input.parcours_id.is_none());
    }

    #[test]
    fn ids_are_shared_across_collections() {
        let mut store = Store::default();
        assert_eq!(store.allocate_id(), 1);
        assert_eq!(store.allocate_id(), 2);
    }
}
