//! Read-side views over the catalog: lists, details, playback, deletes,
//! subscriptions and reviews.

use tracing::info;

use crate::api::CatalogApi;
use crate::error::Result;
use crate::models::{
    EditMetadataRequest, Episode, EpisodePlayback, Movie, MoviePlayback, Resolution,
    ReviewRequest, Show, SubscriptionRequest, SubscriptionType,
};

/// Where to stream a video from, plus the record it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackInfo<T> {
    pub url: String,
    pub method: String,
    pub record: T,
}

impl From<MoviePlayback> for PlaybackInfo<Movie> {
    fn from(playback: MoviePlayback) -> Self {
        Self {
            url: playback.url,
            method: playback.method,
            record: playback.movie,
        }
    }
}

impl From<EpisodePlayback> for PlaybackInfo<Show> {
    fn from(playback: EpisodePlayback) -> Self {
        Self {
            url: playback.url,
            method: playback.method,
            record: playback.show,
        }
    }
}

impl PlaybackInfo<Show> {
    /// The episode being played, looked up by season and episode number
    pub fn episode(&self, season: u64, episode: u64) -> Option<&Episode> {
        self.record
            .seasons
            .iter()
            .find(|s| s.season_number == season)?
            .episodes
            .iter()
            .find(|e| e.episode_number == episode)
    }
}

/// Cached movie and show lists, refreshed on demand
#[derive(Debug, Clone)]
pub struct CatalogView {
    api: CatalogApi,
    movies: Vec<Movie>,
    shows: Vec<Show>,
}

impl CatalogView {
    pub fn new(api: CatalogApi) -> Self {
        Self {
            api,
            movies: Vec::new(),
            shows: Vec::new(),
        }
    }

    pub fn api(&self) -> &CatalogApi {
        &self.api
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    /// Cached movie by id
    pub fn find_movie(&self, id: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    /// Cached show by id
    pub fn find_show(&self, id: &str) -> Option<&Show> {
        self.shows.iter().find(|s| s.id == id)
    }

    pub async fn refresh_movies(&mut self) -> Result<&[Movie]> {
        self.movies = self.api.list_movies().await?;
        info!("🎞️  {} movies in catalog", self.movies.len());
        Ok(&self.movies)
    }

    pub async fn refresh_shows(&mut self) -> Result<&[Show]> {
        self.shows = self.api.list_shows().await?;
        info!("📺 {} shows in catalog", self.shows.len());
        Ok(&self.shows)
    }

    pub async fn movie(&self, id: &str) -> Result<Movie> {
        self.api.movie(id).await
    }

    pub async fn show(&self, id: &str) -> Result<Show> {
        self.api.show(id).await
    }

    pub async fn movie_playback(
        &self,
        uuid: &str,
        resolution: Resolution,
    ) -> Result<PlaybackInfo<Movie>> {
        Ok(self.api.movie_playback(uuid, resolution).await?.into())
    }

    pub async fn episode_playback(
        &self,
        uuid: &str,
        season: u64,
        episode: u64,
        resolution: Resolution,
    ) -> Result<PlaybackInfo<Show>> {
        Ok(self
            .api
            .episode_playback(uuid, season, episode, resolution)
            .await?
            .into())
    }

    /// Delete a movie, then reload the movie list
    pub async fn delete_movie(&mut self, uuid: &str) -> Result<()> {
        self.api.delete_movie(uuid).await?;
        info!("🗑️  Deleted movie {}", uuid);
        self.refresh_movies().await?;
        Ok(())
    }

    /// Delete a show, one of its seasons or one episode, then reload the show list
    pub async fn delete_show(
        &mut self,
        uuid: &str,
        season: Option<u64>,
        episode: Option<u64>,
    ) -> Result<()> {
        self.api.delete_show(uuid, season, episode).await?;
        match (season, episode) {
            (Some(s), Some(e)) => info!("🗑️  Deleted S{}E{} of show {}", s, e, uuid),
            (Some(s), None) => info!("🗑️  Deleted season {} of show {}", s, uuid),
            _ => info!("🗑️  Deleted show {}", uuid),
        }
        self.refresh_shows().await?;
        Ok(())
    }

    pub async fn subscribe(
        &self,
        user_id: &str,
        kind: SubscriptionType,
        target: &str,
    ) -> Result<()> {
        self.api
            .subscribe(&SubscriptionRequest {
                user_id: user_id.to_string(),
                kind,
                target: target.to_string(),
            })
            .await
    }

    pub async fn unsubscribe(&self, subscription_id: &str) -> Result<()> {
        self.api.unsubscribe(subscription_id).await
    }

    /// Queue an admin metadata edit for a movie, show, season or episode
    pub async fn request_metadata_edit(&self, request: &EditMetadataRequest) -> Result<()> {
        if request.episode_number.is_some() && request.season_number.is_none() {
            return Err(crate::error::CatalogError::Validation(
                "an episode edit needs its season".to_string(),
            ));
        }
        self.api.edit_metadata(request).await?;
        info!("✏️  Metadata edit queued for {}", request.target_id);
        Ok(())
    }

    pub async fn review(
        &self,
        user_id: &str,
        target_id: &str,
        grade: u8,
        comment: &str,
    ) -> Result<()> {
        self.api
            .submit_review(&ReviewRequest {
                user_id: user_id.to_string(),
                target_id: target_id.to_string(),
                grade,
                comment: comment.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureLoader;

    #[test]
    fn test_episode_lookup_uses_numbers() {
        let show = FixtureLoader::sample().shows()[0].clone();
        let playback = PlaybackInfo {
            url: "https://cdn/s1e2.mp4".to_string(),
            method: "GET".to_string(),
            record: show,
        };

        assert_eq!(playback.episode(1, 2).unwrap().title, "Midnight");
        assert_eq!(playback.episode(2, 1).unwrap().title, "Dawn");
        assert!(playback.episode(3, 1).is_none());
    }

    #[test]
    fn test_movie_playback_conversion() {
        let movie = FixtureLoader::sample().movies()[0].clone();
        let info: PlaybackInfo<Movie> = MoviePlayback {
            url: "https://cdn/m.mp4".to_string(),
            method: "GET".to_string(),
            movie: movie.clone(),
        }
        .into();
        assert_eq!(info.record, movie);
        assert_eq!(info.method, "GET");
    }
}
