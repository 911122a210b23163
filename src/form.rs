//! Add/edit form submission
//!
//! A `FormController` owns one draft, guards against double submission and
//! drives the submission state machine. What a submit actually sends is up
//! to the draft type (`FormDraft`).

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::api::CatalogApi;
use crate::editor::draft::require_text;
use crate::editor::{EpisodeDraft, MovieDraft, SeasonDraft, ShowDraft, VideoDraft};
use crate::error::{CatalogError, Result};
use crate::models::VideoReplacement;
use crate::upload::{
    PlannedUpload, ProgressSink, SubmissionState, SubmissionTracker, UploadNegotiator,
    UploadReport,
};

/// Result of a successful submit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Id of a newly created record
    pub created_id: Option<String>,

    /// Phase-2 summary, when any video was sent
    pub upload: Option<UploadReport>,
}

/// A draft that knows how to submit itself
#[async_trait]
pub trait FormDraft: Clone + Send + Sync + 'static {
    /// Short name used in log lines
    fn label(&self) -> &'static str;

    /// Whether the submit button should be enabled
    fn is_ready(&self, strict: bool) -> bool;

    /// Required-input checks; nothing is sent when this fails
    fn check(&self, strict: bool) -> Result<()>;

    async fn send(&self, api: &CatalogApi, negotiator: &UploadNegotiator)
        -> Result<SubmitOutcome>;

    /// The draft the form shows after a successful submit
    fn after_success(&self) -> Self;
}

type SuccessCallback = Box<dyn Fn(&SubmitOutcome) + Send + Sync>;

/// Clears the in-flight flag even if the submit future is dropped
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns a draft and submits it at most once at a time
pub struct FormController<D: FormDraft> {
    draft: RwLock<D>,
    strict: bool,
    in_flight: AtomicBool,
    tracker: SubmissionTracker,
    on_success: Option<SuccessCallback>,
}

impl<D: FormDraft> FormController<D> {
    /// New controller in strict mode (every episode must carry a video)
    pub fn new(draft: D) -> Self {
        Self {
            draft: RwLock::new(draft),
            strict: true,
            in_flight: AtomicBool::new(false),
            tracker: SubmissionTracker::default(),
            on_success: None,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.tracker = SubmissionTracker::new(Some(sink));
        self
    }

    /// Called once per successful submit, after the draft has been reset
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SubmitOutcome) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Snapshot of the current draft
    pub async fn draft(&self) -> D {
        self.draft.read().await.clone()
    }

    /// Replace the draft with `edit(current)`; refused while a submit is pending
    pub async fn edit<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&D) -> Result<D>,
    {
        let mut draft = self.draft.write().await;
        if self.is_submitting() {
            return Err(CatalogError::SubmissionInFlight);
        }
        *draft = edit(&draft)?;
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SubmissionState {
        self.tracker.current()
    }

    pub async fn can_submit(&self) -> bool {
        !self.is_submitting() && self.draft.read().await.is_ready(self.strict)
    }

    /// Submit the current draft.
    ///
    /// A call made while another is pending fails with `SubmissionInFlight`
    /// and sends nothing. On success the draft is reset and `on_success`
    /// fires; on failure the draft is kept as it was.
    pub async fn submit(&self, api: &CatalogApi) -> Result<SubmitOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Submit ignored: a submission is already in flight");
            return Err(CatalogError::SubmissionInFlight);
        }
        let _guard = InFlight(&self.in_flight);

        let draft = self.draft.read().await.clone();
        match self.run(&draft, api).await {
            Ok(outcome) => {
                *self.draft.write().await = draft.after_success();
                self.tracker.transition(SubmissionState::Committed);
                info!("✅ {} submitted", draft.label());

                if let Some(callback) = &self.on_success {
                    callback(&outcome);
                }
                Ok(outcome)
            }
            Err(e) => {
                error!("❌ {} submission failed: {}", draft.label(), e);
                if e.leaves_orphan() {
                    warn!("Metadata was stored without its video; the record needs a re-upload");
                }
                self.tracker
                    .transition(SubmissionState::Failed(e.user_message()));
                Err(e)
            }
        }
    }

    async fn run(&self, draft: &D, api: &CatalogApi) -> Result<SubmitOutcome> {
        draft.check(self.strict)?;

        self.tracker.transition(SubmissionState::SubmittingMetadata);
        let negotiator = UploadNegotiator::new(api.transport()).with_tracker(self.tracker.clone());
        draft.send(api, &negotiator).await
    }
}

fn replacement_for(
    uuid: &str,
    video: &VideoDraft,
    season: Option<u64>,
    episode: Option<u64>,
) -> VideoReplacement {
    VideoReplacement {
        uuid: uuid.to_string(),
        file_type: video.mime_type.clone(),
        file_size: video.size,
        season,
        episode,
    }
}

#[async_trait]
impl FormDraft for MovieDraft {
    fn label(&self) -> &'static str {
        "movie"
    }

    fn is_ready(&self, _strict: bool) -> bool {
        self.id.is_some() || self.video.is_some()
    }

    fn check(&self, _strict: bool) -> Result<()> {
        if self.id.is_none() {
            return self.validate();
        }
        require_text("title", &self.title)?;
        require_text("description", &self.description)
    }

    async fn send(
        &self,
        api: &CatalogApi,
        negotiator: &UploadNegotiator,
    ) -> Result<SubmitOutcome> {
        let Some(id) = &self.id else {
            let submission = self.to_submission()?;
            let response = api.submit_movie(&submission).await?;
            let video = self
                .video
                .as_ref()
                .ok_or_else(|| CatalogError::Validation("no video attached".to_string()))?;
            let report = negotiator.upload_movie(&response, video).await?;

            return Ok(SubmitOutcome {
                created_id: report.created_id.clone(),
                upload: Some(report),
            });
        };

        api.update_movie(id, &self.to_update()).await?;

        let upload = match &self.video {
            Some(video) => {
                let target = api
                    .replace_movie_video(&replacement_for(id, video, None, None))
                    .await?;
                Some(
                    negotiator
                        .upload_replacement(&target, video, None, None)
                        .await?,
                )
            }
            None => None,
        };

        Ok(SubmitOutcome {
            created_id: None,
            upload,
        })
    }

    fn after_success(&self) -> Self {
        match self.id {
            None => MovieDraft::new(),
            Some(_) => MovieDraft {
                video: None,
                ..self.clone()
            },
        }
    }
}

#[async_trait]
impl FormDraft for ShowDraft {
    fn label(&self) -> &'static str {
        "TV show"
    }

    fn is_ready(&self, strict: bool) -> bool {
        self.can_submit(strict && self.id.is_none())
    }

    fn check(&self, strict: bool) -> Result<()> {
        self.validate(strict && self.id.is_none())
    }

    async fn send(
        &self,
        api: &CatalogApi,
        negotiator: &UploadNegotiator,
    ) -> Result<SubmitOutcome> {
        let Some(id) = &self.id else {
            let submission = self.to_submission()?;
            let response = api.submit_show(&submission).await?;
            let report = negotiator.upload_show(&response, self).await?;

            return Ok(SubmitOutcome {
                created_id: report.created_id.clone(),
                upload: Some(report),
            });
        };

        api.update_show(id, &self.to_update()).await?;
        for season in &self.seasons {
            if let Some(season_id) = &season.id {
                api.update_season(season_id, &season.to_update()).await?;
            }
            for episode in &season.episodes {
                if let Some(episode_id) = &episode.id {
                    api.update_episode(episode_id, &episode.to_update()).await?;
                }
            }
        }

        // Request every replacement target first, then send the payloads
        let videos = self.videos_in_order();
        if videos.is_empty() {
            return Ok(SubmitOutcome::default());
        }

        let mut targets = Vec::with_capacity(videos.len());
        for ((si, ei), video) in &videos {
            let season = &self.seasons[*si];
            let replacement = replacement_for(
                id,
                video,
                Some(season.season_number),
                Some(season.episodes[*ei].episode_number),
            );
            targets.push(api.replace_episode_video(&replacement).await?);
        }

        let plan: Vec<PlannedUpload<'_>> = videos
            .iter()
            .zip(&targets)
            .map(|(((si, ei), video), target)| PlannedUpload {
                season: Some(*si),
                episode: Some(*ei),
                target,
                video: *video,
            })
            .collect();
        let report = negotiator.upload_planned(&plan, None).await?;

        Ok(SubmitOutcome {
            created_id: None,
            upload: Some(report),
        })
    }

    fn after_success(&self) -> Self {
        if self.id.is_none() {
            return ShowDraft::new();
        }

        let mut kept = self.clone();
        for season in &mut kept.seasons {
            for episode in &mut season.episodes {
                episode.video = None;
            }
        }
        kept
    }
}

#[async_trait]
impl FormDraft for SeasonDraft {
    fn label(&self) -> &'static str {
        "season"
    }

    fn is_ready(&self, _strict: bool) -> bool {
        self.id.is_some()
    }

    fn check(&self, _strict: bool) -> Result<()> {
        if self.id.is_none() {
            return Err(CatalogError::Validation(
                "only existing seasons can be edited".to_string(),
            ));
        }
        Ok(())
    }

    async fn send(
        &self,
        api: &CatalogApi,
        _negotiator: &UploadNegotiator,
    ) -> Result<SubmitOutcome> {
        if let Some(id) = &self.id {
            api.update_season(id, &self.to_update()).await?;
        }
        Ok(SubmitOutcome::default())
    }

    fn after_success(&self) -> Self {
        self.clone()
    }
}

/// Edit form for one existing episode: metadata plus an optional new video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeEdit {
    pub show_id: String,
    pub season_number: u64,
    pub episode: EpisodeDraft,
}

impl EpisodeEdit {
    pub fn new(show_id: impl Into<String>, season_number: u64, episode: EpisodeDraft) -> Self {
        Self {
            show_id: show_id.into(),
            season_number,
            episode,
        }
    }

    fn check_numbers(&self) -> Result<()> {
        if self.season_number == 0 || self.episode.episode_number == 0 {
            return Err(CatalogError::Validation(
                "season and episode numbers start at 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FormDraft for EpisodeEdit {
    fn label(&self) -> &'static str {
        "episode"
    }

    fn is_ready(&self, _strict: bool) -> bool {
        self.episode.id.is_some() || self.episode.video.is_some()
    }

    fn check(&self, _strict: bool) -> Result<()> {
        require_text("title", &self.episode.title)?;
        require_text("description", &self.episode.description)?;
        self.check_numbers()
    }

    async fn send(
        &self,
        api: &CatalogApi,
        negotiator: &UploadNegotiator,
    ) -> Result<SubmitOutcome> {
        self.check_numbers()?;
        if let Some(id) = &self.episode.id {
            api.update_episode(id, &self.episode.to_update()).await?;
        }

        let upload = match &self.episode.video {
            Some(video) => {
                let replacement = replacement_for(
                    &self.show_id,
                    video,
                    Some(self.season_number),
                    Some(self.episode.episode_number),
                );
                let target = api.replace_episode_video(&replacement).await?;
                // Numbers are not positions once episodes have been removed
                Some(
                    negotiator
                        .upload_replacement(&target, video, None, None)
                        .await?,
                )
            }
            None => None,
        };

        Ok(SubmitOutcome {
            created_id: None,
            upload,
        })
    }

    fn after_success(&self) -> Self {
        let mut kept = self.clone();
        kept.episode.video = None;
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_reset_depends_on_mode() {
        let mut create = MovieDraft::new();
        create.title = "Heat".to_string();
        assert_eq!(create.after_success(), MovieDraft::new());

        let mut edit = MovieDraft::new();
        edit.id = Some("m-1".to_string());
        edit.title = "Heat".to_string();
        let kept = edit.after_success();
        assert_eq!(kept.title, "Heat");
        assert!(kept.video.is_none());
    }

    #[test]
    fn test_movie_edit_needs_no_video() {
        let mut edit = MovieDraft::new();
        edit.id = Some("m-1".to_string());
        edit.title = "Heat".to_string();
        edit.description = "LA crime".to_string();

        assert!(edit.is_ready(true));
        assert!(edit.check(true).is_ok());
        assert!(!MovieDraft::new().is_ready(true));
    }

    #[test]
    fn test_show_edit_skips_video_requirement() {
        let mut show = ShowDraft::new();
        show.title = "Dark".to_string();
        show.description = "Time travel".to_string();
        let mut episode = EpisodeDraft::new(1);
        episode.title = "Secrets".to_string();
        episode.description = "Pilot".to_string();
        show.seasons[0].episodes.push(episode);

        assert!(!show.is_ready(true));
        assert!(matches!(show.check(true), Err(CatalogError::MissingVideo { .. })));

        show.id = Some("s-1".to_string());
        assert!(show.is_ready(true));
        assert!(show.check(true).is_ok());
    }

    #[test]
    fn test_new_show_resets_to_initial_shape() {
        let mut show = ShowDraft::new();
        show.title = "Dark".to_string();
        show.seasons.push(SeasonDraft::new(2));
        assert_eq!(show.after_success(), ShowDraft::new());
    }

    #[test]
    fn test_episode_edit_rejects_zero_numbers() {
        let mut episode = EpisodeDraft::new(0);
        episode.title = "t".to_string();
        episode.description = "d".to_string();
        let edit = EpisodeEdit::new("show", 1, episode);
        assert!(matches!(edit.check(true), Err(CatalogError::Validation(_))));
    }
}
