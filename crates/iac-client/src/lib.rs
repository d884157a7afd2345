//! Client for the image analysis backend.
//!
//! The backend performs all of the actual forensics (hashing, EXIF
//! extraction, error level analysis, scoring). This crate only knows its
//! request/response contract:
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | `POST /upload` | multipart `file`, `known_sha256`, `known_md5` | [`UploadResult`](iac_model::UploadResult) |
//! | `GET /uploads/{ela_filename}` | - | ELA image bytes |
//! | `POST /ai-analyze-metadata` | `{ metadata }` | [`AiAnalysisResult`](iac_model::AiAnalysisResult) |
//! | `POST /verify-authenticity` | `{ file_name }` | [`AuthenticityReport`](iac_model::AuthenticityReport) |
//! | `POST /simulate-metadata` | `{ file_name, edits }` | [`SimulationResult`](iac_model::SimulationResult) |
//!
//! [`AnalysisBackend`] abstracts the contract so the session orchestrator can
//! be driven by [`HttpBackend`] in production and by scripted fakes in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use backend::AnalysisBackend;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::HttpBackend;
