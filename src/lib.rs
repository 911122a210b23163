/// Catalog Client - admin front-end core for a movie/TV catalog
///
/// Draft editing for nested show/season/episode forms, two-phase media
/// ingestion (metadata first, then the binary payloads to server-issued
/// upload targets), and typed access to the catalog REST API.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod fixtures;
pub mod form;
pub mod logging;
pub mod models;
pub mod transport;
pub mod upload;

// Re-export main types for easy access
pub use crate::api::CatalogApi;
pub use crate::auth::{Anonymous, EnvToken, StaticToken, TokenProvider};
pub use crate::catalog::{CatalogView, PlaybackInfo};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::editor::{
    EntityPath, EpisodeDraft, ListField, MovieAction, MovieDraft, SeasonDraft, ShowAction,
    ShowDraft, TextField, VideoDraft,
};
pub use crate::error::{CatalogError, Result};
pub use crate::fixtures::FixtureLoader;
pub use crate::form::{EpisodeEdit, FormController, FormDraft, SubmitOutcome};
pub use crate::models::{Movie, Resolution, Show, SubscriptionType, UploadDescriptor};
pub use crate::transport::{HttpRequest, HttpResponse, RequestBody, ReqwestTransport, Transport};
pub use crate::upload::{ProgressSink, SubmissionState, UploadNegotiator, UploadReport};
