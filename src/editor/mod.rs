/// Draft editing for the add/edit forms
///
/// Drafts are plain values; edits go through typed actions that return a
/// new draft instead of mutating in place.

pub mod action;
pub mod draft;

pub use action::{EntityPath, EpisodeAction, ListField, MovieAction, ShowAction, TextField};
pub use draft::{
    join_list, mime_for_path, parse_list, EpisodeDraft, FileMetadata, MovieDraft, SeasonDraft,
    ShowDraft, VideoDraft,
};
