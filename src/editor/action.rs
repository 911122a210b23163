//! Typed edit actions and the reducer that applies them.
//!
//! Every operation takes `&self` and returns a new tree; the input is never
//! mutated, so a caller holding the previous draft can compare the two.

use std::fmt;
use tracing::debug;

use super::draft::{parse_list, EpisodeDraft, MovieDraft, SeasonDraft, ShowDraft, VideoDraft};
use crate::error::{CatalogError, Result};

/// Positional address into the show tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPath {
    Show,
    Season(usize),
    Episode(usize, usize),
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityPath::Show => write!(f, "show"),
            EntityPath::Season(s) => write!(f, "season[{}]", s),
            EntityPath::Episode(s, e) => write!(f, "season[{}].episode[{}]", s, e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Genres,
    Actors,
    Directors,
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextField::Title => f.write_str("title"),
            TextField::Description => f.write_str("description"),
        }
    }
}

impl fmt::Display for ListField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListField::Genres => f.write_str("genres"),
            ListField::Actors => f.write_str("actors"),
            ListField::Directors => f.write_str("directors"),
        }
    }
}

/// Edits on a show draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowAction {
    SetField {
        path: EntityPath,
        field: TextField,
        value: String,
    },
    SetListField {
        path: EntityPath,
        field: ListField,
        raw: String,
    },
    AddSeason,
    RemoveSeason(usize),
    AddEpisode(usize),
    RemoveEpisode(usize, usize),
    AttachVideo {
        season: usize,
        episode: usize,
        video: VideoDraft,
    },
}

/// Edits on a movie draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieAction {
    SetField { field: TextField, value: String },
    SetListField { field: ListField, raw: String },
    AttachVideo(VideoDraft),
    DetachVideo,
}

fn unsupported(path: EntityPath, field: impl fmt::Display) -> CatalogError {
    CatalogError::UnsupportedField {
        path: path.to_string(),
        field: field.to_string(),
    }
}

impl ShowDraft {
    /// Apply one action, producing the next draft
    pub fn apply(&self, action: ShowAction) -> Result<ShowDraft> {
        debug!("show draft action: {:?}", action);
        match action {
            ShowAction::SetField { path, field, value } => self.set_field(path, field, value),
            ShowAction::SetListField { path, field, raw } => {
                self.set_list_field(path, field, &raw)
            }
            ShowAction::AddSeason => Ok(self.add_season()),
            ShowAction::RemoveSeason(index) => self.remove_season(index),
            ShowAction::AddEpisode(season) => self.add_episode(season),
            ShowAction::RemoveEpisode(season, episode) => self.remove_episode(season, episode),
            ShowAction::AttachVideo {
                season,
                episode,
                video,
            } => self.attach_video(season, episode, video),
        }
    }

    /// Replace a scalar field at `path`
    pub fn set_field(&self, path: EntityPath, field: TextField, value: String) -> Result<ShowDraft> {
        let mut next = self.clone();
        match path {
            EntityPath::Show => match field {
                TextField::Title => next.title = value,
                TextField::Description => next.description = value,
            },
            EntityPath::Season(s) => {
                let season = next.season_mut(s)?;
                match field {
                    TextField::Description => season.description = value,
                    TextField::Title => return Err(unsupported(path, field)),
                }
            }
            EntityPath::Episode(s, e) => {
                let episode = next.episode_mut(s, e)?;
                match field {
                    TextField::Title => episode.title = value,
                    TextField::Description => episode.description = value,
                }
            }
        }
        Ok(next)
    }

    /// Replace a list field at `path` from comma-separated input
    pub fn set_list_field(&self, path: EntityPath, field: ListField, raw: &str) -> Result<ShowDraft> {
        let items = parse_list(raw);
        let mut next = self.clone();
        match path {
            EntityPath::Show => match field {
                ListField::Genres => next.genres = items,
                ListField::Actors => next.actors = items,
                ListField::Directors => next.directors = items,
            },
            EntityPath::Season(_) => return Err(unsupported(path, field)),
            EntityPath::Episode(s, e) => {
                let episode = next.episode_mut(s, e)?;
                match field {
                    ListField::Actors => episode.actors = items,
                    ListField::Directors => episode.directors = items,
                    ListField::Genres => return Err(unsupported(path, field)),
                }
            }
        }
        Ok(next)
    }

    /// Append a season numbered `len + 1`
    pub fn add_season(&self) -> ShowDraft {
        let mut next = self.clone();
        let number = next.seasons.len() as u64 + 1;
        next.seasons.push(SeasonDraft::new(number));
        next
    }

    /// Remove by position; remaining seasons keep their numbers
    pub fn remove_season(&self, index: usize) -> Result<ShowDraft> {
        if index >= self.seasons.len() {
            return Err(CatalogError::InvalidPath(EntityPath::Season(index).to_string()));
        }
        let mut next = self.clone();
        next.seasons.remove(index);
        Ok(next)
    }

    /// Append an episode numbered `len + 1` within the season
    pub fn add_episode(&self, season: usize) -> Result<ShowDraft> {
        let mut next = self.clone();
        let target = next.season_mut(season)?;
        let number = target.episodes.len() as u64 + 1;
        target.episodes.push(EpisodeDraft::new(number));
        Ok(next)
    }

    /// Remove by position; remaining episodes keep their numbers
    pub fn remove_episode(&self, season: usize, episode: usize) -> Result<ShowDraft> {
        let mut next = self.clone();
        let target = next.season_mut(season)?;
        if episode >= target.episodes.len() {
            return Err(CatalogError::InvalidPath(
                EntityPath::Episode(season, episode).to_string(),
            ));
        }
        target.episodes.remove(episode);
        Ok(next)
    }

    pub fn attach_video(&self, season: usize, episode: usize, video: VideoDraft) -> Result<ShowDraft> {
        let mut next = self.clone();
        next.episode_mut(season, episode)?.video = Some(video);
        Ok(next)
    }

    fn season_mut(&mut self, season: usize) -> Result<&mut SeasonDraft> {
        self.seasons
            .get_mut(season)
            .ok_or_else(|| CatalogError::InvalidPath(EntityPath::Season(season).to_string()))
    }

    fn episode_mut(&mut self, season: usize, episode: usize) -> Result<&mut EpisodeDraft> {
        self.season_mut(season)?
            .episodes
            .get_mut(episode)
            .ok_or_else(|| {
                CatalogError::InvalidPath(EntityPath::Episode(season, episode).to_string())
            })
    }
}

impl MovieDraft {
    pub fn apply(&self, action: MovieAction) -> Result<MovieDraft> {
        debug!("movie draft action: {:?}", action);
        let mut next = self.clone();
        match action {
            MovieAction::SetField { field, value } => match field {
                TextField::Title => next.title = value,
                TextField::Description => next.description = value,
            },
            MovieAction::SetListField { field, raw } => {
                let items = parse_list(&raw);
                match field {
                    ListField::Genres => next.genres = items,
                    ListField::Actors => next.actors = items,
                    ListField::Directors => next.directors = items,
                }
            }
            MovieAction::AttachVideo(video) => next.video = Some(video),
            MovieAction::DetachVideo => next.video = None,
        }
        Ok(next)
    }
}

/// Episode drafts are edited on their own by the edit-episode form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeAction {
    SetField { field: TextField, value: String },
    SetListField { field: ListField, raw: String },
    AttachVideo(VideoDraft),
}

impl EpisodeDraft {
    pub fn apply(&self, action: EpisodeAction) -> Result<EpisodeDraft> {
        let mut next = self.clone();
        match action {
            EpisodeAction::SetField { field, value } => match field {
                TextField::Title => next.title = value,
                TextField::Description => next.description = value,
            },
            EpisodeAction::SetListField { field, raw } => match field {
                ListField::Actors => next.actors = parse_list(&raw),
                ListField::Directors => next.directors = parse_list(&raw),
                ListField::Genres => {
                    return Err(CatalogError::UnsupportedField {
                        path: "episode".to_string(),
                        field: field.to_string(),
                    })
                }
            },
            EpisodeAction::AttachVideo(video) => next.video = Some(video),
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::draft::FileMetadata;
    use chrono::Utc;

    fn video(name: &str) -> VideoDraft {
        VideoDraft::new(
            name,
            FileMetadata {
                mime_type: "video/mp4".to_string(),
                size: 42,
                last_modified: Utc::now(),
            },
        )
    }

    fn season_numbers(show: &ShowDraft) -> Vec<u64> {
        show.seasons.iter().map(|s| s.season_number).collect()
    }

    fn episode_numbers(show: &ShowDraft, season: usize) -> Vec<u64> {
        show.seasons[season]
            .episodes
            .iter()
            .map(|e| e.episode_number)
            .collect()
    }

    #[test]
    fn test_add_season_appends_next_number() {
        let show = ShowDraft::new().add_season();
        assert_eq!(season_numbers(&show), vec![1, 2]);

        let show = show.apply(ShowAction::AddSeason).unwrap();
        assert_eq!(season_numbers(&show), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_season_does_not_renumber() {
        let show = ShowDraft::new().add_season().add_season();
        let show = show.remove_season(1).unwrap();
        assert_eq!(season_numbers(&show), vec![1, 3]);

        // Numbers come from the length, so a duplicate can appear
        let show = show.add_season();
        assert_eq!(season_numbers(&show), vec![1, 3, 3]);
    }

    #[test]
    fn test_add_episode_numbers_from_length() {
        let show = ShowDraft::new().add_episode(0).unwrap();
        assert_eq!(episode_numbers(&show, 0), vec![1]);

        let show = show.add_episode(0).unwrap();
        assert_eq!(episode_numbers(&show, 0), vec![1, 2]);

        let show = show.remove_episode(0, 0).unwrap();
        assert_eq!(episode_numbers(&show, 0), vec![2]);

        let show = show.add_episode(0).unwrap();
        assert_eq!(episode_numbers(&show, 0), vec![2, 2]);
    }

    #[test]
    fn test_add_episode_after_removal_reuses_length_not_max() {
        let show = ShowDraft::new()
            .add_episode(0)
            .and_then(|s| s.add_episode(0))
            .and_then(|s| s.add_episode(0))
            .and_then(|s| s.remove_episode(0, 0))
            .and_then(|s| s.add_episode(0))
            .unwrap();

        assert_eq!(episode_numbers(&show, 0), vec![2, 3, 3]);
    }

    #[test]
    fn test_operations_leave_input_untouched() {
        let original = ShowDraft::new();
        let next = original.add_episode(0).unwrap();

        assert!(original.seasons[0].episodes.is_empty());
        assert_eq!(next.seasons[0].episodes.len(), 1);
        assert_ne!(original, next);
    }

    #[test]
    fn test_set_field_on_missing_entity_fails_loudly() {
        let show = ShowDraft::new();
        let err = show
            .set_field(EntityPath::Episode(0, 3), TextField::Title, "x".to_string())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(ref p) if p == "season[0].episode[3]"));

        let err = show.remove_season(5).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(_)));

        let err = show.add_episode(2).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(_)));
    }

    #[test]
    fn test_set_field_on_each_level() {
        let show = ShowDraft::new()
            .add_episode(0)
            .unwrap()
            .apply(ShowAction::SetField {
                path: EntityPath::Show,
                field: TextField::Title,
                value: "Dark".to_string(),
            })
            .unwrap()
            .apply(ShowAction::SetField {
                path: EntityPath::Season(0),
                field: TextField::Description,
                value: "Origins".to_string(),
            })
            .unwrap()
            .apply(ShowAction::SetField {
                path: EntityPath::Episode(0, 0),
                field: TextField::Title,
                value: "Secrets".to_string(),
            })
            .unwrap();

        assert_eq!(show.title, "Dark");
        assert_eq!(show.seasons[0].description, "Origins");
        assert_eq!(show.seasons[0].episodes[0].title, "Secrets");
    }

    #[test]
    fn test_unsupported_fields_are_rejected() {
        let show = ShowDraft::new().add_episode(0).unwrap();

        let err = show
            .set_field(EntityPath::Season(0), TextField::Title, "x".to_string())
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedField { .. }));

        let err = show
            .set_list_field(EntityPath::Episode(0, 0), ListField::Genres, "a")
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedField { .. }));
    }

    #[test]
    fn test_set_list_field_uses_comma_parsing() {
        let show = ShowDraft::new()
            .add_episode(0)
            .unwrap()
            .set_list_field(EntityPath::Show, ListField::Genres, "Drama, Mystery")
            .unwrap()
            .set_list_field(EntityPath::Episode(0, 0), ListField::Actors, "")
            .unwrap();

        assert_eq!(show.genres, vec!["Drama", "Mystery"]);
        assert_eq!(show.seasons[0].episodes[0].actors, vec![""]);
    }

    #[test]
    fn test_attach_video_enables_strict_submission() {
        let show = ShowDraft::new().add_episode(0).unwrap();
        assert!(!show.can_submit(true));

        let show = show
            .apply(ShowAction::AttachVideo {
                season: 0,
                episode: 0,
                video: video("e1.mp4"),
            })
            .unwrap();
        assert!(show.can_submit(true));

        let show = show.add_season();
        assert!(!show.can_submit(false));
    }

    #[test]
    fn test_movie_actions() {
        let movie = MovieDraft::new()
            .apply(MovieAction::SetField {
                field: TextField::Title,
                value: "Heat".to_string(),
            })
            .unwrap()
            .apply(MovieAction::SetListField {
                field: ListField::Directors,
                raw: "Michael Mann".to_string(),
            })
            .unwrap()
            .apply(MovieAction::AttachVideo(video("heat.mp4")))
            .unwrap();

        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.directors, vec!["Michael Mann"]);
        assert!(movie.can_submit());

        let movie = movie.apply(MovieAction::DetachVideo).unwrap();
        assert!(!movie.can_submit());
    }

    #[test]
    fn test_episode_actions() {
        let episode = EpisodeDraft::new(4)
            .apply(EpisodeAction::SetListField {
                field: ListField::Actors,
                raw: "A, B".to_string(),
            })
            .unwrap();
        assert_eq!(episode.actors, vec!["A", "B"]);
        assert!(episode
            .apply(EpisodeAction::SetListField {
                field: ListField::Genres,
                raw: "x".to_string(),
            })
            .is_err());
    }
}
