//! Catalog REST API client
//!
//! One method per endpoint the front-end consumes. Every call asks the
//! configured `TokenProvider` for a bearer token and attaches it when present.

pub mod routes;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{bearer_header, provider_from_config, TokenProvider};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{
    EditMetadataRequest, EpisodePlayback, MetadataUpdate, Movie, MoviePlayback,
    MovieSubmission, MovieUploadResponse, Resolution, ReviewRequest, SeasonUpdate, Show,
    ShowSubmission, ShowUploadResponse, SubscriptionRequest, UploadDescriptor, VideoReplacement,
};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Client for the catalog API
#[derive(Clone)]
pub struct CatalogApi {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for CatalogApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CatalogApi {
    /// Create a client; `base_url` must be an absolute http(s) URL
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CatalogError::Config(format!(
                "unsupported API scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            transport,
            tokens,
        })
    }

    /// Client over reqwest, with the token source picked from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.api.timeout_seconds, &config.api.user_agent)?;
        let tokens: Arc<dyn TokenProvider> = Arc::from(provider_from_config(&config.auth)?);
        Self::new(&config.api.base_url, Arc::new(transport), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Transport shared with the upload negotiator
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Absolute URL for an API path, with optional query parameters
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn authorized(&self, request: HttpRequest) -> Result<HttpRequest> {
        match self.tokens.bearer_token().await? {
            Some(token) => Ok(request.header("Authorization", bearer_header(&token))),
            None => Ok(request),
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.authorized(request).await?;
        debug!("➡️  {} {}", request.method, request.url);
        self.transport.send(request).await
    }

    /// Send and turn a non-2xx status into `RequestFailed`
    async fn execute(&self, request: HttpRequest, context: &str) -> Result<HttpResponse> {
        let response = self.send(request).await?;
        if !response.is_success() {
            warn!("{} failed with status {}", context, response.status);
            return Err(CatalogError::RequestFailed {
                context: context.to_string(),
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T> {
        let response = self
            .execute(HttpRequest::new("GET", url.as_str()), context)
            .await?;
        response.json()
    }

    async fn put_json<B: Serialize>(&self, url: Url, body: &B, context: &str) -> Result<()> {
        let request = HttpRequest::new("PUT", url.as_str()).json(body)?;
        self.execute(request, context).await?;
        Ok(())
    }

    /// Phase 1 of an ingestion: non-2xx becomes `MetadataSubmissionFailed`
    async fn submit_metadata<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let request = HttpRequest::new(method, url.as_str()).json(body)?;
        let response = self.send(request).await?;
        if !response.is_success() {
            warn!("Metadata submission to {} rejected: {}", url, response.status);
            return Err(CatalogError::MetadataSubmissionFailed {
                status: response.status,
                body: response.text(),
            });
        }
        response.json()
    }

    // --- ingestion (phase 1) ---

    pub async fn submit_movie(&self, movie: &MovieSubmission) -> Result<MovieUploadResponse> {
        let url = self.url(routes::MOVIES, &[])?;
        self.submit_metadata("POST", url, movie).await
    }

    pub async fn submit_show(&self, show: &ShowSubmission) -> Result<ShowUploadResponse> {
        let url = self.url(routes::SHOWS, &[])?;
        self.submit_metadata("POST", url, show).await
    }

    /// Ask for a fresh upload target for an existing movie's video
    pub async fn replace_movie_video(&self, request: &VideoReplacement) -> Result<UploadDescriptor> {
        let url = self.url(routes::MOVIE_VIDEO, &[])?;
        self.submit_metadata("PUT", url, request).await
    }

    /// Ask for a fresh upload target for one episode's video
    pub async fn replace_episode_video(
        &self,
        request: &VideoReplacement,
    ) -> Result<UploadDescriptor> {
        if request.season.is_none() || request.episode.is_none() {
            return Err(CatalogError::Validation(
                "episode video replacement needs season and episode".to_string(),
            ));
        }
        let url = self.url(routes::SHOW_VIDEO, &[])?;
        self.submit_metadata("PUT", url, request).await
    }

    // --- metadata updates ---

    pub async fn update_movie(&self, id: &str, update: &MetadataUpdate) -> Result<()> {
        let url = self.url(&routes::movie(id), &[])?;
        self.put_json(url, update, "Update movie").await
    }

    pub async fn update_show(&self, id: &str, update: &MetadataUpdate) -> Result<()> {
        let url = self.url(&routes::tv_show(id), &[])?;
        self.put_json(url, update, "Update TV show").await
    }

    pub async fn update_season(&self, id: &str, update: &SeasonUpdate) -> Result<()> {
        let url = self.url(&routes::season(id), &[])?;
        self.put_json(url, update, "Update season").await
    }

    pub async fn update_episode(&self, id: &str, update: &MetadataUpdate) -> Result<()> {
        let url = self.url(&routes::episode(id), &[])?;
        self.put_json(url, update, "Update episode").await
    }

    /// Queue a metadata edit request (admin)
    pub async fn edit_metadata(&self, request: &EditMetadataRequest) -> Result<()> {
        let url = self.url(routes::EDIT_METADATA, &[])?;
        self.put_json(url, request, "Edit metadata").await
    }

    // --- reads ---

    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        let url = self.url(routes::MOVIES, &[])?;
        self.get_json(url, "List movies").await
    }

    pub async fn list_shows(&self) -> Result<Vec<Show>> {
        let url = self.url(routes::SHOWS, &[])?;
        self.get_json(url, "List shows").await
    }

    pub async fn movie(&self, id: &str) -> Result<Movie> {
        let url = self.url(&routes::movie(id), &[])?;
        self.get_json(url, "Fetch movie").await
    }

    pub async fn show(&self, id: &str) -> Result<Show> {
        let url = self.url(&routes::show(id), &[])?;
        self.get_json(url, "Fetch show").await
    }

    pub async fn movie_playback(&self, uuid: &str, resolution: Resolution) -> Result<MoviePlayback> {
        let url = self.url(
            routes::MOVIE_VIDEO,
            &[
                ("uuid", uuid.to_string()),
                ("resolution", resolution.as_query().to_string()),
            ],
        )?;
        self.get_json(url, "Fetch movie video").await
    }

    pub async fn episode_playback(
        &self,
        uuid: &str,
        season: u64,
        episode: u64,
        resolution: Resolution,
    ) -> Result<EpisodePlayback> {
        let url = self.url(
            routes::SHOW_VIDEO,
            &[
                ("uuid", uuid.to_string()),
                ("season", season.to_string()),
                ("episode", episode.to_string()),
                ("resolution", resolution.as_query().to_string()),
            ],
        )?;
        self.get_json(url, "Fetch episode video").await
    }

    // --- deletes ---

    pub async fn delete_movie(&self, uuid: &str) -> Result<()> {
        let url = self.url(routes::MOVIE_VIDEO, &[("uuid", uuid.to_string())])?;
        self.execute(HttpRequest::new("DELETE", url.as_str()), "Delete movie")
            .await?;
        Ok(())
    }

    /// Delete a whole show, one season, or one episode
    pub async fn delete_show(
        &self,
        uuid: &str,
        season: Option<u64>,
        episode: Option<u64>,
    ) -> Result<()> {
        let mut query = vec![("uuid", uuid.to_string())];
        match (season, episode) {
            (None, Some(_)) => {
                return Err(CatalogError::Validation(
                    "an episode can only be deleted within a season".to_string(),
                ))
            }
            (Some(s), e) => {
                query.push(("season", s.to_string()));
                if let Some(e) = e {
                    query.push(("episode", e.to_string()));
                }
            }
            (None, None) => {}
        }

        let url = self.url(routes::SHOW_VIDEO, &query)?;
        self.execute(HttpRequest::new("DELETE", url.as_str()), "Delete TV show")
            .await?;
        Ok(())
    }

    // --- subscriptions & reviews ---

    pub async fn subscribe(&self, request: &SubscriptionRequest) -> Result<()> {
        let url = self.url(routes::SUBSCRIPTION, &[])?;
        let request = HttpRequest::new("POST", url.as_str()).json(request)?;
        self.execute(request, "Subscribe").await?;
        Ok(())
    }

    /// The subscription id travels as the raw request body
    pub async fn unsubscribe(&self, subscription_id: &str) -> Result<()> {
        let url = self.url(routes::SUBSCRIPTION, &[])?;
        let request = HttpRequest::new("DELETE", url.as_str())
            .header("Content-Type", "text/plain")
            .body(subscription_id.as_bytes().to_vec());
        self.execute(request, "Unsubscribe").await?;
        Ok(())
    }

    pub async fn submit_review(&self, review: &ReviewRequest) -> Result<()> {
        if !(1..=5).contains(&review.grade) {
            return Err(CatalogError::Validation(format!(
                "grade must be between 1 and 5, got {}",
                review.grade
            )));
        }
        let url = self.url(routes::REVIEW, &[])?;
        let request = HttpRequest::new("POST", url.as_str()).json(review)?;
        self.execute(request, "Submit review").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Anonymous;

    fn api(base: &str) -> Result<CatalogApi> {
        let transport = ReqwestTransport::new(0, "catalog-client-test")?;
        CatalogApi::new(base, Arc::new(transport), Arc::new(Anonymous))
    }

    #[test]
    fn test_url_joins_paths_and_query() {
        let api = api("https://catalog.example/stage/").unwrap();
        assert_eq!(api.base_url(), "https://catalog.example/stage");

        let url = api
            .url(routes::SHOW_VIDEO, &[("uuid", "a b".to_string()), ("season", "1".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "https://catalog.example/stage/tvShow?uuid=a+b&season=1");
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(matches!(api("ftp://catalog.example"), Err(CatalogError::Config(_))));
        assert!(matches!(api("not a url"), Err(CatalogError::Url(_))));
    }
}
