//! Domain entities and the payloads sent to the backend.
//!
//! # Design
//! The wire contract is asymmetric. Payloads carry foreign keys
//! (`parcours_id`, `parcoursIds`); responses carry either embedded objects or
//! bare ids. Entities therefore never serialize themselves directly: each one
//! exposes `to_payload`, and responses go through the records in `mapping`.
//!
//! Every field is nullable. A track known only by its id is a valid `Track`,
//! and an entity built client-side before creation has `id: None`.

use serde::{Deserialize, Serialize};

/// An academic track ("Parcours").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    #[serde(rename = "NomParcours", default)]
    pub name: Option<String>,
    #[serde(rename = "AnneeFormation", default)]
    pub formation_year: Option<i32>,
}

impl Track {
    pub fn new(name: impl Into<String>, formation_year: i32) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            formation_year: Some(formation_year),
        }
    }

    /// A track known only by its identity.
    pub fn stub(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn to_payload(&self) -> TrackPayload {
        TrackPayload {
            name: self.name.clone(),
            formation_year: self.formation_year,
        }
    }
}

/// A student, optionally enrolled in one track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Student {
    pub id: Option<i64>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub track: Option<Track>,
}

impl Student {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        email: impl Into<String>,
        track: Option<Track>,
    ) -> Self {
        Self {
            id: None,
            last_name: Some(last_name.into()),
            first_name: Some(first_name.into()),
            email: Some(email.into()),
            track,
        }
    }

    pub fn to_payload(&self) -> StudentPayload {
        StudentPayload {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            email: self.email.clone(),
            track_id: self.track.as_ref().and_then(|track| track.id),
        }
    }
}

/// A course unit ("UE") and the tracks it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseUnit {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub code: Option<i64>,
    pub tracks: Vec<Track>,
}

impl CourseUnit {
    pub fn new(title: impl Into<String>, code: i64) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            code: Some(code),
            tracks: Vec::new(),
        }
    }

    /// Replace the associated tracks wholesale.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    /// Ids of the associated tracks, skipping tracks not yet persisted.
    pub fn track_ids(&self) -> Vec<i64> {
        self.tracks.iter().filter_map(|track| track.id).collect()
    }

    pub fn to_payload(&self) -> CourseUnitPayload {
        CourseUnitPayload {
            title: self.title.clone(),
            code: self.code,
        }
    }
}

/// A row of the track enrollment listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollee {
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    #[serde(rename = "nom", default)]
    pub last_name: Option<String>,
    #[serde(rename = "prenom", default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST`/`PUT /api/etudiants`. `parcours_id` is always present,
/// null when the student has no track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayload {
    #[serde(rename = "nom")]
    pub last_name: Option<String>,
    #[serde(rename = "prenom")]
    pub first_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "parcours_id")]
    pub track_id: Option<i64>,
}

/// Body of `POST`/`PUT /api/Parcours`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPayload {
    #[serde(rename = "NomParcours")]
    pub name: Option<String>,
    #[serde(rename = "AnneeFormation")]
    pub formation_year: Option<i32>,
}

/// Body of `POST`/`PUT /api/Ue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUnitPayload {
    #[serde(rename = "Intitule")]
    pub title: Option<String>,
    #[serde(rename = "NumeroUe")]
    pub code: Option<i64>,
}

/// Body of `PUT /api/Ues/:id/parcours`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTracksPayload {
    #[serde(rename = "parcoursIds")]
    pub track_ids: Vec<i64>,
}
