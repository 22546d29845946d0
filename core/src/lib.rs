//! Async client for the enrollment management API.
//!
//! # Overview
//! Students (`/api/etudiants`), tracks (`/api/Parcours`) and course units
//! (`/api/Ue`) are reached through one DAO each, bundled in `ApiClient`.
//!
//! # Design
//! - Each DAO operation is a pure `build_*` / `parse_*` pair plus an async
//!   method that runs the pair through a `Transport`.
//! - Writes send foreign-key payloads; reads accept bare or enveloped bodies
//!   and embedded or id-only relations (see `mapping`).
//! - Every failure surfaces as a `DaoError` carrying the best message the
//!   backend offered.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod message;
pub mod resource;
pub mod students;
pub mod tracks;
pub mod transport;
pub mod types;
pub mod units;

pub use client::ApiClient;
pub use config::{Config, ConfigError};
pub use error::{ApiError, DaoError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use students::StudentDao;
pub use tracks::TrackDao;
pub use transport::{ReqwestTransport, Transport};
pub use types::{CourseUnit, Enrollee, Student, Track};
pub use units::CourseUnitDao;
