//! Tolerant decoding of backend responses into entities.
//!
//! # Design
//! The backend is inconsistent about response shapes, so decoding runs two
//! ordered matchers instead of ad-hoc optional chaining:
//!
//! 1. [`Body::classify`] decides whether the entity sits under an envelope
//!    key (`{message, etudiant: {...}}`) or is the whole body.
//! 2. [`Relation::from_fields`] decides whether a related track is embedded,
//!    referenced by a bare foreign key, or absent; [`Relation::resolve`] then
//!    falls back to what the caller already knew, so a partial response never
//!    nulls a relationship out.
//!
//! Update responses get a third pass, [`Resource::preserve`], which restores
//! any scalar field the backend left out from the pre-update entity.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{CourseUnit, Student, Track};

/// Where the entity lives inside a decoded response body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body<'a> {
    /// `{message, <key>: {...}}`; holds the inner object.
    Enveloped(&'a Value),
    /// The body is the entity.
    Bare(&'a Value),
}

impl<'a> Body<'a> {
    /// The envelope key wins when it holds an object; anything else is bare.
    pub fn classify(value: &'a Value, key: &str) -> Self {
        match value.get(key) {
            Some(inner) if inner.is_object() => Body::Enveloped(inner),
            _ => Body::Bare(value),
        }
    }

    pub fn entity(self) -> &'a Value {
        match self {
            Body::Enveloped(inner) | Body::Bare(inner) => inner,
        }
    }
}

/// How a response describes a related track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Embedded(Track),
    ForeignKey(i64),
    Absent,
}

impl Relation {
    /// Embedded object first, then the foreign key.
    pub fn from_fields(embedded: Option<Track>, foreign_key: Option<i64>) -> Self {
        match (embedded, foreign_key) {
            (Some(track), _) => Relation::Embedded(track),
            (None, Some(id)) => Relation::ForeignKey(id),
            (None, None) => Relation::Absent,
        }
    }

    pub fn resolve(self, known: Option<&Track>) -> Option<Track> {
        match self {
            Relation::Embedded(track) => Some(track),
            Relation::ForeignKey(id) => Some(Track::stub(id)),
            Relation::Absent => known.cloned(),
        }
    }
}

/// An entity that can be decoded from a backend response.
pub trait Resource: Sized {
    /// Key under which enveloped responses nest the entity.
    const ENVELOPE_KEY: &'static str;

    /// Raw wire shape, every field optional.
    type Record: DeserializeOwned;

    /// Map a record, resolving relations against `known` when the record
    /// omits them.
    fn from_record(record: Self::Record, known: Option<&Self>) -> Self;

    /// Restore fields an update response omitted. `id` is the path id.
    fn preserve(self, previous: &Self, id: i64) -> Self;
}

fn parse_json(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn record_from<E: Resource>(value: &Value) -> Result<E::Record, ApiError> {
    <E::Record as Deserialize>::deserialize(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Decode a single entity from a bare or enveloped body.
///
/// A body that is not a JSON object (empty, plain text, a scalar) carries no
/// entity fields and decodes as an empty record, so relations and preserved
/// fields come from `known`.
pub fn decode<E: Resource>(body: &str, known: Option<&E>) -> Result<E, ApiError> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) if value.is_object() => value,
        _ => Value::Object(Default::default()),
    };
    let entity = Body::classify(&value, E::ENVELOPE_KEY).entity();
    Ok(E::from_record(record_from::<E>(entity)?, known))
}

/// Decode an update response, keeping every field the response left out.
pub fn decode_update<E: Resource>(body: &str, previous: &E, id: i64) -> Result<E, ApiError> {
    decode(body, Some(previous)).map(|entity| entity.preserve(previous, id))
}

/// Decode a JSON array of bare entities.
pub fn decode_list<E: Resource>(body: &str) -> Result<Vec<E>, ApiError> {
    let value = parse_json(body)?;
    let items = value
        .as_array()
        .ok_or_else(|| ApiError::Deserialization("expected a JSON array".to_string()))?;
    items
        .iter()
        .map(|item| record_from::<E>(item).map(|record| E::from_record(record, None)))
        .collect()
}

fn keep<T: Clone>(current: Option<T>, previous: &Option<T>) -> Option<T> {
    current.or_else(|| previous.clone())
}

/// Student as returned by `/api/etudiants`.
#[derive(Debug, Default, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub parcours: Option<Track>,
    #[serde(default)]
    pub parcours_id: Option<i64>,
}

impl Resource for Student {
    const ENVELOPE_KEY: &'static str = "etudiant";
    type Record = StudentRecord;

    fn from_record(record: StudentRecord, known: Option<&Self>) -> Self {
        let track = Relation::from_fields(record.parcours, record.parcours_id)
            .resolve(known.and_then(|student| student.track.as_ref()));
        Student {
            id: record.id,
            last_name: record.nom,
            first_name: record.prenom,
            email: record.email,
            track,
        }
    }

    fn preserve(self, previous: &Self, id: i64) -> Self {
        Student {
            id: self.id.or(Some(id)),
            last_name: keep(self.last_name, &previous.last_name),
            first_name: keep(self.first_name, &previous.first_name),
            email: keep(self.email, &previous.email),
            track: keep(self.track, &previous.track),
        }
    }
}

impl Resource for Track {
    const ENVELOPE_KEY: &'static str = "parcours";
    type Record = Track;

    fn from_record(record: Track, _known: Option<&Self>) -> Self {
        record
    }

    fn preserve(self, previous: &Self, id: i64) -> Self {
        Track {
            id: self.id.or(Some(id)),
            name: keep(self.name, &previous.name),
            formation_year: keep(self.formation_year, &previous.formation_year),
        }
    }
}

/// Course unit as returned by `/api/Ue`.
#[derive(Debug, Default, Deserialize)]
pub struct CourseUnitRecord {
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    #[serde(rename = "Intitule", default)]
    pub title: Option<String>,
    #[serde(rename = "NumeroUe", default)]
    pub code: Option<i64>,
    #[serde(rename = "Parcours", default)]
    pub tracks: Option<Vec<Track>>,
}

impl Resource for CourseUnit {
    const ENVELOPE_KEY: &'static str = "ue";
    type Record = CourseUnitRecord;

    fn from_record(record: CourseUnitRecord, known: Option<&Self>) -> Self {
        let tracks = record
            .tracks
            .or_else(|| known.map(|unit| unit.tracks.clone()))
            .unwrap_or_default();
        CourseUnit {
            id: record.id,
            title: record.title,
            code: record.code,
            tracks,
        }
    }

    fn preserve(self, previous: &Self, id: i64) -> Self {
        CourseUnit {
            id: self.id.or(Some(id)),
            title: keep(self.title, &previous.title),
            code: keep(self.code, &previous.code),
            tracks: self.tracks,
        }
    }
}
