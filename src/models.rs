//! Wire types exchanged with the catalog REST API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Video metadata sent with a phase-1 submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// MIME type of the payload
    pub file_type: String,

    /// Payload size in bytes
    pub file_size: u64,

    /// File creation time, epoch milliseconds
    pub creation_timestamp: i64,

    /// Last change time, epoch milliseconds
    pub last_change_timestamp: i64,
}

/// Video record as stored by the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Video {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub creation_timestamp: i64,
    pub last_change_timestamp: i64,
    /// Set by the server once transcoding finished
    pub ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub video: Option<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Episode {
    pub id: Option<String>,
    pub episode_number: u64,
    pub title: String,
    pub description: String,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub video: Option<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Season {
    pub id: Option<String>,
    pub season_number: u64,
    pub description: Option<String>,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Show {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub seasons: Vec<Season>,
}

/// Phase-1 body for a new movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSubmission {
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub video: VideoMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSubmission {
    pub episode_number: u64,
    pub title: String,
    pub description: String,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub video: VideoMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSubmission {
    pub season_number: u64,
    pub episodes: Vec<EpisodeSubmission>,
}

/// Phase-1 body for a new show, seasons and episodes included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSubmission {
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub seasons: Vec<SeasonSubmission>,
}

/// Metadata-only update of a movie, show or episode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataUpdate {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonUpdate {
    pub season_number: u64,
    pub description: String,
}

/// Body of `PUT /movie` and `PUT /tvShow`: request a new upload target for an existing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReplacement {
    pub uuid: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u64>,
}

/// Where and how to send one binary payload.
///
/// Accepts the full `{ "url", "method" }` object as well as a bare URL
/// string; a bare string means `PUT`, the only method the presigner issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadDescriptor {
    pub url: String,
    pub method: String,
}

impl UploadDescriptor {
    pub fn put(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "PUT".to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for UploadDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Url(String),
            Full {
                #[serde(alias = "uploadUrl")]
                url: String,
                #[serde(default = "default_method")]
                method: String,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Url(url) => UploadDescriptor::put(url),
            Raw::Full { url, method } => UploadDescriptor { url, method },
        })
    }
}

fn default_method() -> String {
    "PUT".to_string()
}

/// Phase-1 response for a single-payload submission.
///
/// Like `UploadDescriptor`, a bare URL string is accepted and means `PUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieUploadResponse {
    pub url: String,
    pub method: String,
    pub movie_id: Option<String>,
}

impl<'de> Deserialize<'de> for MovieUploadResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Url(String),
            Full {
                #[serde(alias = "uploadUrl")]
                url: String,
                #[serde(default = "default_method")]
                method: String,
                #[serde(default, rename = "movieId")]
                movie_id: Option<String>,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Url(url) => MovieUploadResponse {
                url,
                method: default_method(),
                movie_id: None,
            },
            Raw::Full {
                url,
                method,
                movie_id,
            } => MovieUploadResponse {
                url,
                method,
                movie_id,
            },
        })
    }
}

impl MovieUploadResponse {
    pub fn target(&self) -> UploadDescriptor {
        UploadDescriptor {
            url: self.url.clone(),
            method: self.method.clone(),
        }
    }
}

/// Phase-1 response for a show: targets indexed `[season_index][episode_index]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUploadResponse {
    #[serde(default)]
    pub show_id: Option<String>,
    pub upload_urls: Vec<Vec<UploadDescriptor>>,
}

impl ShowUploadResponse {
    pub fn target(&self, season: usize, episode: usize) -> Option<&UploadDescriptor> {
        self.upload_urls.get(season).and_then(|s| s.get(episode))
    }
}

/// Stream resolutions the transcoder produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1920:1080")]
    Full,
    #[serde(rename = "1280:720")]
    Hd,
}

impl Resolution {
    pub fn as_query(&self) -> &'static str {
        match self {
            Resolution::Full => "1920:1080",
            Resolution::Hd => "1280:720",
        }
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1920:1080" | "1080p" | "full" => Ok(Resolution::Full),
            "1280:720" | "720p" | "hd" => Ok(Resolution::Hd),
            other => Err(format!("unknown resolution: {}", other)),
        }
    }
}

/// Playable reference for a movie
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoviePlayback {
    pub url: String,
    pub method: String,
    pub movie: Movie,
}

/// Playable reference for an episode, with the surrounding show
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EpisodePlayback {
    pub url: String,
    pub method: String,
    pub show: Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionType {
    Actor = 0,
    Director = 1,
    Genre = 2,
}

impl Serialize for SubscriptionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for SubscriptionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(SubscriptionType::Actor),
            1 => Ok(SubscriptionType::Director),
            2 => Ok(SubscriptionType::Genre),
            other => Err(serde::de::Error::custom(format!(
                "unknown subscription type {}",
                other
            ))),
        }
    }
}

impl std::str::FromStr for SubscriptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "actor" => Ok(SubscriptionType::Actor),
            "director" => Ok(SubscriptionType::Director),
            "genre" => Ok(SubscriptionType::Genre),
            other => Err(format!("unknown subscription kind: {}", other)),
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriptionType::Actor => "Actor",
            SubscriptionType::Director => "Director",
            SubscriptionType::Genre => "Genre",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "Type")]
    pub kind: SubscriptionType,
    #[serde(rename = "Target")]
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: String,
    pub target_id: String,
    /// 1 to 5
    pub grade: u8,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMetadataRequest {
    pub target_id: String,
    pub title: String,
    pub description: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub directors: Vec<String>,
    pub season_number: Option<u64>,
    pub episode_number: Option<u64>,
}
