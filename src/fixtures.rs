//! JSON catalog fixtures for demos and tests
//!
//! A fixture file holds ready-made catalog records and, optionally, a show
//! draft whose episodes point at local video files:
//!
//! ```json
//! {
//!   "movies": [{ "id": "m1", "title": "Heat", ... }],
//!   "shows": [],
//!   "showDraft": {
//!     "title": "Dark",
//!     "description": "...",
//!     "genres": "Drama, Sci-Fi",
//!     "seasons": [{ "description": "", "episodes": [{ "title": "Secrets", "description": "...", "video": "s1e1.mp4" }] }]
//!   }
//! }
//! ```
//!
//! Relative video paths resolve against the fixture file's directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

use crate::editor::{EntityPath, ListField, ShowAction, ShowDraft, TextField, VideoDraft};
use crate::error::{CatalogError, Result};
use crate::models::{Episode, Movie, Season, Show, Video};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CatalogFixture {
    movies: Vec<Movie>,
    shows: Vec<Show>,
    show_draft: Option<ShowFixture>,
}

/// Show draft as written in a fixture; list fields use the form's comma syntax
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ShowFixture {
    title: String,
    description: String,
    genres: String,
    actors: String,
    directors: String,
    seasons: Vec<SeasonFixture>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SeasonFixture {
    description: String,
    episodes: Vec<EpisodeFixture>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EpisodeFixture {
    title: String,
    description: String,
    actors: String,
    directors: String,
    video: Option<PathBuf>,
}

/// Injectable source of catalog records and drafts
#[derive(Debug, Clone)]
pub struct FixtureLoader {
    fixture: CatalogFixture,
    base_dir: PathBuf,
}

impl FromStr for FixtureLoader {
    type Err = CatalogError;

    /// Parse fixture JSON; relative video paths resolve against the working directory
    fn from_str(json: &str) -> Result<Self> {
        Ok(Self {
            fixture: serde_json::from_str(json)?,
            base_dir: PathBuf::from("."),
        })
    }
}

impl FixtureLoader {
    /// Load a fixture file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let fixture: CatalogFixture = serde_json::from_str(&content)?;

        info!(
            "📂 Loaded fixture {} ({} movies, {} shows)",
            path.display(),
            fixture.movies.len(),
            fixture.shows.len()
        );

        Ok(Self {
            fixture,
            base_dir: path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// Built-in records for demos
    pub fn sample() -> Self {
        let movie = |id: &str, title: &str, genres: &[&str], director: &str| Movie {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} (sample record)", title),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            actors: Vec::new(),
            directors: vec![director.to_string()],
            video: Some(Video {
                file_name: format!("{}.mp4", id),
                file_type: "video/mp4".to_string(),
                ready: true,
                ..Video::default()
            }),
        };

        let episode = |number: u64, title: &str| Episode {
            id: None,
            episode_number: number,
            title: title.to_string(),
            description: String::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            video: None,
        };

        let show = Show {
            id: "sample-show-1".to_string(),
            title: "The Long Night".to_string(),
            description: "A sample series".to_string(),
            genres: vec!["Drama".to_string()],
            actors: vec!["Ana Vidal".to_string()],
            directors: vec!["Marko Ilic".to_string()],
            seasons: vec![
                Season {
                    id: None,
                    season_number: 1,
                    description: Some("Pilot season".to_string()),
                    episodes: vec![episode(1, "Dusk"), episode(2, "Midnight")],
                },
                Season {
                    id: None,
                    season_number: 2,
                    description: None,
                    episodes: vec![episode(1, "Dawn")],
                },
            ],
        };

        Self {
            fixture: CatalogFixture {
                movies: vec![
                    movie("sample-movie-1", "Harbor Lights", &["Drama"], "Ivana Kos"),
                    movie("sample-movie-2", "Cold Front", &["Thriller", "Crime"], "Luka Horvat"),
                ],
                shows: vec![show],
                show_draft: None,
            },
            base_dir: PathBuf::from("."),
        }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.fixture.movies
    }

    pub fn shows(&self) -> &[Show] {
        &self.fixture.shows
    }

    pub fn has_show_draft(&self) -> bool {
        self.fixture.show_draft.is_some()
    }

    /// Build the fixture's show draft, probing every referenced video file
    pub async fn show_draft(&self) -> Result<ShowDraft> {
        let fixture = self
            .fixture
            .show_draft
            .as_ref()
            .ok_or_else(|| CatalogError::Validation("fixture has no showDraft".to_string()))?;

        let mut draft = ShowDraft::new()
            .apply(text(EntityPath::Show, TextField::Title, &fixture.title))?
            .apply(text(EntityPath::Show, TextField::Description, &fixture.description))?;

        for (field, raw) in [
            (ListField::Genres, &fixture.genres),
            (ListField::Actors, &fixture.actors),
            (ListField::Directors, &fixture.directors),
        ] {
            if !raw.is_empty() {
                draft = draft.apply(list(EntityPath::Show, field, raw))?;
            }
        }

        for (si, season) in fixture.seasons.iter().enumerate() {
            if si > 0 {
                draft = draft.apply(ShowAction::AddSeason)?;
            }
            draft = draft.apply(text(
                EntityPath::Season(si),
                TextField::Description,
                &season.description,
            ))?;

            for (ei, episode) in season.episodes.iter().enumerate() {
                let path = EntityPath::Episode(si, ei);
                draft = draft
                    .apply(ShowAction::AddEpisode(si))?
                    .apply(text(path, TextField::Title, &episode.title))?
                    .apply(text(path, TextField::Description, &episode.description))?;

                if !episode.actors.is_empty() {
                    draft = draft.apply(list(path, ListField::Actors, &episode.actors))?;
                }
                if !episode.directors.is_empty() {
                    draft = draft.apply(list(path, ListField::Directors, &episode.directors))?;
                }

                if let Some(video) = &episode.video {
                    let resolved = self.base_dir.join(video);
                    debug!("S{}E{} video: {}", si + 1, ei + 1, resolved.display());
                    draft = draft.apply(ShowAction::AttachVideo {
                        season: si,
                        episode: ei,
                        video: VideoDraft::from_path(&resolved).await?,
                    })?;
                }
            }
        }

        Ok(draft)
    }
}

fn text(path: EntityPath, field: TextField, value: &str) -> ShowAction {
    ShowAction::SetField {
        path,
        field,
        value: value.to_string(),
    }
}

fn list(path: EntityPath, field: ListField, raw: &str) -> ShowAction {
    ShowAction::SetListField {
        path,
        field,
        raw: raw.to_string(),
    }
}
