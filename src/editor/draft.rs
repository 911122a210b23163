//! Draft catalog entries as held by an open add/edit form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{CatalogError, Result};
use crate::models::{
    EpisodeSubmission, MetadataUpdate, Movie, MovieSubmission, SeasonSubmission, SeasonUpdate,
    Show, ShowSubmission, VideoMetadata,
};

/// Split comma-separated input into a list field.
///
/// Every segment is trimmed; empty segments and duplicates are kept, so
/// `""` yields `[""]`.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

/// Render a list field back into the comma-separated form shown in inputs
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// MIME type for a video file, from its extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("ts") => "video/mp2t",
        _ => "application/octet-stream",
    }
}

/// What the file picker reports about a selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub mime_type: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl FileMetadata {
    /// Read size and modification time from disk
    pub async fn probe(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(CatalogError::Validation(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let last_modified: DateTime<Utc> = meta.modified()?.into();

        Ok(Self {
            mime_type: mime_for_path(path).to_string(),
            size: meta.len(),
            last_modified,
        })
    }
}

/// A selected but not yet uploaded video file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDraft {
    /// Local file holding the payload
    pub path: PathBuf,

    pub mime_type: String,

    pub size: u64,

    /// File's last-modified time, epoch milliseconds
    pub creation_timestamp: i64,

    /// When the file was attached to the draft, epoch milliseconds
    pub last_change_timestamp: i64,
}

impl VideoDraft {
    pub fn new(path: impl Into<PathBuf>, metadata: FileMetadata) -> Self {
        Self {
            path: path.into(),
            mime_type: metadata.mime_type,
            size: metadata.size,
            creation_timestamp: metadata.last_modified.timestamp_millis(),
            last_change_timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Probe `path` and build a draft from what is on disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = FileMetadata::probe(path).await?;
        Ok(Self::new(path, metadata))
    }

    /// The metadata half of a phase-1 submission
    pub fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            file_type: self.mime_type.clone(),
            file_size: self.size,
            creation_timestamp: self.creation_timestamp,
            last_change_timestamp: self.last_change_timestamp,
        }
    }

    /// Size of the file as it is on disk now, without reading it
    pub async fn current_size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.path).await?.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeDraft {
    /// Server id when editing an existing episode
    pub id: Option<String>,
    pub episode_number: u64,
    pub title: String,
    pub description: String,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub video: Option<VideoDraft>,
}

impl EpisodeDraft {
    pub fn new(episode_number: u64) -> Self {
        Self {
            id: None,
            episode_number,
            title: String::new(),
            description: String::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            video: None,
        }
    }

    pub fn from_episode(episode: &crate::models::Episode) -> Self {
        Self {
            id: episode.id.clone(),
            episode_number: episode.episode_number,
            title: episode.title.clone(),
            description: episode.description.clone(),
            actors: episode.actors.clone(),
            directors: episode.directors.clone(),
            video: None,
        }
    }

    pub fn to_update(&self) -> MetadataUpdate {
        MetadataUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            genres: None,
            actors: self.actors.clone(),
            directors: self.directors.clone(),
            episode_number: Some(self.episode_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDraft {
    /// Server id when editing an existing season
    pub id: Option<String>,
    pub season_number: u64,
    pub description: String,
    pub episodes: Vec<EpisodeDraft>,
}

impl SeasonDraft {
    pub fn new(season_number: u64) -> Self {
        Self {
            id: None,
            season_number,
            description: String::new(),
            episodes: Vec::new(),
        }
    }

    pub fn to_update(&self) -> SeasonUpdate {
        SeasonUpdate {
            season_number: self.season_number,
            description: self.description.clone(),
        }
    }
}

/// Show → seasons → episodes tree behind the "add TV show" form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowDraft {
    /// Server id when editing an existing show
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub seasons: Vec<SeasonDraft>,
}

impl Default for ShowDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ShowDraft {
    /// Initial form shape: one empty season numbered 1
    pub fn new() -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            genres: Vec::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            seasons: vec![SeasonDraft::new(1)],
        }
    }

    /// Draft for editing an existing show's metadata
    pub fn from_show(show: &Show) -> Self {
        Self {
            id: Some(show.id.clone()).filter(|id| !id.is_empty()),
            title: show.title.clone(),
            description: show.description.clone(),
            genres: show.genres.clone(),
            actors: show.actors.clone(),
            directors: show.directors.clone(),
            seasons: show
                .seasons
                .iter()
                .map(|season| SeasonDraft {
                    id: season.id.clone(),
                    season_number: season.season_number,
                    description: season.description.clone().unwrap_or_default(),
                    episodes: season.episodes.iter().map(EpisodeDraft::from_episode).collect(),
                })
                .collect(),
        }
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }

    /// Indexes of seasons with no episodes
    pub fn empty_seasons(&self) -> Vec<usize> {
        self.seasons
            .iter()
            .enumerate()
            .filter(|(_, s)| s.episodes.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// `(season_index, episode_index)` of every episode without a video
    pub fn missing_videos(&self) -> Vec<(usize, usize)> {
        let mut missing = Vec::new();
        for (si, season) in self.seasons.iter().enumerate() {
            for (ei, episode) in season.episodes.iter().enumerate() {
                if episode.video.is_none() {
                    missing.push((si, ei));
                }
            }
        }
        missing
    }

    /// Every season has an episode and, when `strict`, every episode has a video
    pub fn can_submit(&self, strict: bool) -> bool {
        self.empty_seasons().is_empty() && (!strict || self.missing_videos().is_empty())
    }

    /// Required-input checks run before any request is made
    pub fn validate(&self, strict: bool) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;

        if let Some(season) = self.empty_seasons().first() {
            return Err(CatalogError::Validation(format!(
                "season {} has no episodes",
                self.seasons[*season].season_number
            )));
        }

        for season in &self.seasons {
            for episode in &season.episodes {
                let label = format!("S{}E{}", season.season_number, episode.episode_number);
                require_text(&format!("{} title", label), &episode.title)?;
                require_text(&format!("{} description", label), &episode.description)?;
            }
        }

        if strict {
            if let Some((season, episode)) = self.missing_videos().first().copied() {
                return Err(CatalogError::MissingVideo { season, episode });
            }
        }

        Ok(())
    }

    /// Phase-1 body; every episode must carry a video
    pub fn to_submission(&self) -> Result<ShowSubmission> {
        let seasons = self
            .seasons
            .iter()
            .enumerate()
            .map(|(si, season)| {
                let episodes = season
                    .episodes
                    .iter()
                    .enumerate()
                    .map(|(ei, episode)| {
                        let video = episode.video.as_ref().ok_or(CatalogError::MissingVideo {
                            season: si,
                            episode: ei,
                        })?;
                        Ok(EpisodeSubmission {
                            episode_number: episode.episode_number,
                            title: episode.title.clone(),
                            description: episode.description.clone(),
                            actors: episode.actors.clone(),
                            directors: episode.directors.clone(),
                            video: video.metadata(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(SeasonSubmission {
                    season_number: season.season_number,
                    episodes,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ShowSubmission {
            title: self.title.clone(),
            description: self.description.clone(),
            genres: self.genres.clone(),
            actors: self.actors.clone(),
            directors: self.directors.clone(),
            seasons,
        })
    }

    /// Metadata-only update of the show record
    pub fn to_update(&self) -> MetadataUpdate {
        MetadataUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            genres: Some(self.genres.clone()),
            actors: self.actors.clone(),
            directors: self.directors.clone(),
            episode_number: None,
        }
    }

    /// Videos in upload order: season-major, episode-minor
    pub fn videos_in_order(&self) -> Vec<((usize, usize), &VideoDraft)> {
        let mut videos = Vec::new();
        for (si, season) in self.seasons.iter().enumerate() {
            for (ei, episode) in season.episodes.iter().enumerate() {
                if let Some(video) = &episode.video {
                    videos.push(((si, ei), video));
                }
            }
        }
        videos
    }
}

/// Flat movie draft behind the add/edit movie forms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDraft {
    /// Server id when editing an existing movie
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub video: Option<VideoDraft>,
}

impl MovieDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            id: Some(movie.id.clone()).filter(|id| !id.is_empty()),
            title: movie.title.clone(),
            description: movie.description.clone(),
            genres: movie.genres.clone(),
            actors: movie.actors.clone(),
            directors: movie.directors.clone(),
            video: None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.video.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        if self.video.is_none() {
            return Err(CatalogError::Validation("no video attached".to_string()));
        }
        Ok(())
    }

    pub fn to_submission(&self) -> Result<MovieSubmission> {
        let video = self
            .video
            .as_ref()
            .ok_or_else(|| CatalogError::Validation("no video attached".to_string()))?;

        Ok(MovieSubmission {
            title: self.title.clone(),
            description: self.description.clone(),
            genres: self.genres.clone(),
            actors: self.actors.clone(),
            directors: self.directors.clone(),
            video: video.metadata(),
        })
    }

    pub fn to_update(&self) -> MetadataUpdate {
        MetadataUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            genres: Some(self.genres.clone()),
            actors: self.actors.clone(),
            directors: self.directors.clone(),
            episode_number: None,
        }
    }
}

pub(crate) fn require_text(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{} is required", name)));
    }
    Ok(())
}
