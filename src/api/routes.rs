//! Paths of the catalog API, relative to the base URL

pub const MOVIES: &str = "api/movies";
pub const SHOWS: &str = "api/shows";

/// Playback, deletion and video replacement for movies
pub const MOVIE_VIDEO: &str = "movie";
/// Playback, deletion and video replacement for shows
pub const SHOW_VIDEO: &str = "tvShow";

pub const SUBSCRIPTION: &str = "subscription";
pub const REVIEW: &str = "review";
pub const EDIT_METADATA: &str = "editMetadata";

pub fn movie(id: &str) -> String {
    format!("{}/{}", MOVIES, urlencoding::encode(id))
}

pub fn show(id: &str) -> String {
    format!("{}/{}", SHOWS, urlencoding::encode(id))
}

pub fn tv_show(id: &str) -> String {
    format!("api/tvshows/{}", urlencoding::encode(id))
}

pub fn season(id: &str) -> String {
    format!("api/seasons/{}", urlencoding::encode(id))
}

pub fn episode(id: &str) -> String {
    format!("api/episodes/{}", urlencoding::encode(id))
}
