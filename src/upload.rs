//! Phase-2 media uploads
//!
//! Phase 1 is a metadata request made through `CatalogApi`; its response
//! says where each binary payload goes. The negotiator sends those payloads
//! one at a time, in season-major order, straight to the upload targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::editor::{ShowDraft, VideoDraft};
use crate::error::{CatalogError, Result};
use crate::models::{MovieUploadResponse, ShowUploadResponse, UploadDescriptor};
use crate::transport::{HttpRequest, Transport};

/// Lifecycle of one form submission
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,

    /// Phase-1 request in flight
    SubmittingMetadata,

    /// Phase-2 payload `index` (0-based) of `total` in flight
    UploadingMedia { index: usize, total: usize },

    /// Every request succeeded
    Committed,

    /// Stopped at the first error; carries the user-facing message
    Failed(String),
}

impl SubmissionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SubmissionState::SubmittingMetadata | SubmissionState::UploadingMedia { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Committed | SubmissionState::Failed(_))
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::SubmittingMetadata => write!(f, "submitting metadata"),
            SubmissionState::UploadingMedia { index, total } => {
                write!(f, "uploading video {}/{}", index + 1, total)
            }
            SubmissionState::Committed => write!(f, "committed"),
            SubmissionState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Receives every submission state transition
pub trait ProgressSink: Send + Sync {
    fn on_state(&self, state: &SubmissionState);
}

impl<F> ProgressSink for F
where
    F: Fn(&SubmissionState) + Send + Sync,
{
    fn on_state(&self, state: &SubmissionState) {
        self(state)
    }
}

/// Holds the current state and forwards transitions to an optional sink
#[derive(Clone, Default)]
pub struct SubmissionTracker {
    current: Arc<Mutex<SubmissionState>>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl fmt::Debug for SubmissionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionTracker")
            .field("current", &self.current())
            .finish()
    }
}

impl SubmissionTracker {
    pub fn new(sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            current: Arc::new(Mutex::new(SubmissionState::Idle)),
            sink,
        }
    }

    pub fn current(&self) -> SubmissionState {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn transition(&self, state: SubmissionState) {
        match &state {
            SubmissionState::Failed(reason) => warn!("📛 Submission failed: {}", reason),
            SubmissionState::Committed => info!("✅ Submission committed"),
            other => info!("📤 Submission state: {}", other),
        }

        {
            let mut current = self
                .current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *current = state.clone();
        }

        if let Some(sink) = &self.sink {
            sink.on_state(&state);
        }
    }
}

/// Outcome of a completed upload run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    /// Payloads sent
    pub payloads: usize,

    pub bytes_sent: u64,

    /// Id of the record created in phase 1, when the server returned one
    pub created_id: Option<String>,
}

/// One resolved phase-2 request
#[derive(Debug, Clone, Copy)]
pub struct PlannedUpload<'a> {
    pub season: Option<usize>,
    pub episode: Option<usize>,
    pub target: &'a UploadDescriptor,
    pub video: &'a VideoDraft,
}

/// Pair every episode video of `draft` with its target in `response`.
///
/// Fails before anything is sent if an episode has no video or the
/// response has no target for it.
pub fn plan_show_uploads<'a>(
    response: &'a ShowUploadResponse,
    draft: &'a ShowDraft,
) -> Result<Vec<PlannedUpload<'a>>> {
    let mut plan = Vec::with_capacity(draft.episode_count());

    for (si, season) in draft.seasons.iter().enumerate() {
        for (ei, episode) in season.episodes.iter().enumerate() {
            let video = episode.video.as_ref().ok_or(CatalogError::MissingVideo {
                season: si,
                episode: ei,
            })?;
            let target = response
                .target(si, ei)
                .ok_or(CatalogError::MissingUploadTarget {
                    season: si,
                    episode: ei,
                })?;

            plan.push(PlannedUpload {
                season: Some(si),
                episode: Some(ei),
                target,
                video,
            });
        }
    }

    let offered: usize = response.upload_urls.iter().map(Vec::len).sum();
    if offered > plan.len() {
        warn!(
            "Server offered {} upload targets for {} episodes; extra targets ignored",
            offered,
            plan.len()
        );
    }

    Ok(plan)
}

/// Sends phase-2 payloads to the targets handed out by phase 1
#[derive(Clone)]
pub struct UploadNegotiator {
    transport: Arc<dyn Transport>,
    tracker: SubmissionTracker,
}

impl UploadNegotiator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            tracker: SubmissionTracker::default(),
        }
    }

    /// Report transitions through an existing tracker
    pub fn with_tracker(mut self, tracker: SubmissionTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn tracker(&self) -> &SubmissionTracker {
        &self.tracker
    }

    /// Send one payload; returns the number of bytes sent.
    ///
    /// The file is streamed from disk, never held whole in memory. The
    /// request goes out without the API bearer token: the target URL is
    /// itself the credential.
    pub async fn upload_one(
        &self,
        target: &UploadDescriptor,
        video: &VideoDraft,
        season: Option<usize>,
        episode: Option<usize>,
    ) -> Result<u64> {
        let size = video.current_size().await?;
        if size != video.size {
            warn!(
                "{} changed since it was attached ({} -> {} bytes)",
                video.path.display(),
                video.size,
                size
            );
        }

        debug!(
            "⬆️  {} {} ({} bytes, {})",
            target.method, target.url, size, video.mime_type
        );

        let request = HttpRequest::new(target.method.as_str(), target.url.as_str())
            .header("Content-Type", video.mime_type.as_str())
            .file(&video.path, size);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(CatalogError::UploadFailed {
                season,
                episode,
                status: response.status,
            });
        }

        Ok(size)
    }

    /// Phase 2 for a movie: a single payload
    pub async fn upload_movie(
        &self,
        response: &MovieUploadResponse,
        video: &VideoDraft,
    ) -> Result<UploadReport> {
        self.tracker
            .transition(SubmissionState::UploadingMedia { index: 0, total: 1 });

        let bytes_sent = self
            .upload_one(&response.target(), video, None, None)
            .await?;

        Ok(UploadReport {
            payloads: 1,
            bytes_sent,
            created_id: response.movie_id.clone(),
        })
    }

    /// Phase 2 for a replaced video on an existing record
    pub async fn upload_replacement(
        &self,
        target: &UploadDescriptor,
        video: &VideoDraft,
        season: Option<usize>,
        episode: Option<usize>,
    ) -> Result<UploadReport> {
        self.tracker
            .transition(SubmissionState::UploadingMedia { index: 0, total: 1 });

        let bytes_sent = self.upload_one(target, video, season, episode).await?;
        Ok(UploadReport {
            payloads: 1,
            bytes_sent,
            created_id: None,
        })
    }

    /// Phase 2 for a show: every episode video, strictly one after another
    pub async fn upload_show(
        &self,
        response: &ShowUploadResponse,
        draft: &ShowDraft,
    ) -> Result<UploadReport> {
        let plan = plan_show_uploads(response, draft)?;
        info!("🎬 Uploading {} episode videos", plan.len());
        self.upload_planned(&plan, response.show_id.clone()).await
    }

    /// Send already-resolved uploads in order, stopping at the first failure
    pub async fn upload_planned(
        &self,
        plan: &[PlannedUpload<'_>],
        created_id: Option<String>,
    ) -> Result<UploadReport> {
        let total = plan.len();
        let mut report = UploadReport {
            payloads: 0,
            bytes_sent: 0,
            created_id,
        };

        for (index, upload) in plan.iter().enumerate() {
            self.tracker
                .transition(SubmissionState::UploadingMedia { index, total });

            report.bytes_sent += self
                .upload_one(upload.target, upload.video, upload.season, upload.episode)
                .await?;
            report.payloads += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EpisodeDraft;
    use crate::transport::{HttpResponse, RequestBody};
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Answers every request with `status`, remembering what it saw
    struct FixedStatus {
        status: u16,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for FixedStatus {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse::new(self.status, Vec::new()))
        }
    }

    fn transport(status: u16) -> Arc<FixedStatus> {
        Arc::new(FixedStatus {
            status,
            seen: Mutex::new(Vec::new()),
        })
    }

    async fn video(dir: &TempDir, name: &str, bytes: &[u8]) -> VideoDraft {
        let path = dir.path().join(name);
        tokio::fs::write(&path, bytes).await.unwrap();
        VideoDraft::from_path(&path).await.unwrap()
    }

    async fn show_with(dir: &TempDir, layout: &[usize]) -> ShowDraft {
        let mut show = ShowDraft::new();
        show.seasons.clear();
        for (si, count) in layout.iter().enumerate() {
            let mut season = crate::editor::SeasonDraft::new(si as u64 + 1);
            for ei in 0..*count {
                let mut episode = EpisodeDraft::new(ei as u64 + 1);
                episode.video = Some(video(dir, &format!("s{}e{}.mp4", si, ei), b"abc").await);
                season.episodes.push(episode);
            }
            show.seasons.push(season);
        }
        show
    }

    #[test]
    fn test_state_flags() {
        assert!(SubmissionState::SubmittingMetadata.is_in_flight());
        assert!(SubmissionState::UploadingMedia { index: 0, total: 2 }.is_in_flight());
        assert!(!SubmissionState::Idle.is_in_flight());
        assert!(SubmissionState::Failed("x".into()).is_terminal());
        assert_eq!(
            SubmissionState::UploadingMedia { index: 1, total: 3 }.to_string(),
            "uploading video 2/3"
        );
    }

    #[test]
    fn test_tracker_forwards_transitions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: Arc<dyn ProgressSink> = Arc::new(move |state: &SubmissionState| {
            sink_seen.lock().unwrap().push(state.clone());
        });

        let tracker = SubmissionTracker::new(Some(sink));
        tracker.transition(SubmissionState::SubmittingMetadata);
        tracker.transition(SubmissionState::Committed);

        assert_eq!(tracker.current(), SubmissionState::Committed);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SubmissionState::SubmittingMetadata, SubmissionState::Committed]
        );
    }

    #[tokio::test]
    async fn test_upload_uses_descriptor_method_and_mime_type() {
        let dir = TempDir::new().unwrap();
        let draft = video(&dir, "movie.webm", b"payload").await;
        let fake = transport(200);
        let negotiator = UploadNegotiator::new(fake.clone());

        let target = UploadDescriptor {
            url: "https://blob.example/put-here?sig=1".to_string(),
            method: "POST".to_string(),
        };
        let sent = negotiator.upload_one(&target, &draft, None, None).await.unwrap();
        assert_eq!(sent, 7);

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].url, target.url);
        assert_eq!(seen[0].header_value("Content-Type"), Some("video/webm"));
        assert_eq!(seen[0].header_value("Authorization"), None);
        assert_eq!(
            seen[0].body,
            Some(RequestBody::File {
                path: draft.path.clone(),
                len: 7
            })
        );
    }

    #[tokio::test]
    async fn test_upload_size_comes_from_disk_not_the_attached_draft() {
        let dir = TempDir::new().unwrap();
        let draft = video(&dir, "grown.mp4", b"abc").await;
        tokio::fs::write(&draft.path, b"abcdefgh").await.unwrap();

        let fake = transport(200);
        let negotiator = UploadNegotiator::new(fake.clone());
        let target = UploadDescriptor {
            url: "https://blob.example/grown".to_string(),
            method: "PUT".to_string(),
        };
        let sent = negotiator.upload_one(&target, &draft, None, None).await.unwrap();

        assert_eq!(draft.size, 3);
        assert_eq!(sent, 8);
        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen[0].body.as_ref().map(RequestBody::len), Some(8));
        assert_eq!(seen[0].body_bytes(), None);
    }

    #[tokio::test]
    async fn test_upload_failure_names_the_episode() {
        let dir = TempDir::new().unwrap();
        let show = show_with(&dir, &[1, 2]).await;
        let response: ShowUploadResponse =
            serde_json::from_str(r#"{"uploadUrls": [["u1"], ["u2", "u3"]]}"#).unwrap();

        let negotiator = UploadNegotiator::new(transport(500));
        let err = negotiator.upload_show(&response, &show).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UploadFailed {
                season: Some(0),
                episode: Some(0),
                status: 500
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_target_detected_before_sending() {
        let dir = TempDir::new().unwrap();
        let show = show_with(&dir, &[2, 1]).await;
        let response: ShowUploadResponse =
            serde_json::from_str(r#"{"uploadUrls": [["u1", "u2"]]}"#).unwrap();

        let fake = transport(200);
        let negotiator = UploadNegotiator::new(fake.clone());
        let err = negotiator.upload_show(&response, &show).await.unwrap_err();

        assert!(matches!(
            err,
            CatalogError::MissingUploadTarget { season: 1, episode: 0 }
        ));
        assert!(fake.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_report_and_progress() {
        let dir = TempDir::new().unwrap();
        let show = show_with(&dir, &[2, 1]).await;
        let response: ShowUploadResponse = serde_json::from_str(
            r#"{"showId": "show-9", "uploadUrls": [["u1", "u2"], ["u3"]]}"#,
        )
        .unwrap();

        let states = Arc::new(Mutex::new(Vec::new()));
        let sink_states = Arc::clone(&states);
        let tracker = SubmissionTracker::new(Some(Arc::new(move |s: &SubmissionState| {
            sink_states.lock().unwrap().push(s.clone());
        })));

        let negotiator = UploadNegotiator::new(transport(201)).with_tracker(tracker);
        let report = negotiator.upload_show(&response, &show).await.unwrap();

        assert_eq!(report.payloads, 3);
        assert_eq!(report.bytes_sent, 9);
        assert_eq!(report.created_id.as_deref(), Some("show-9"));
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                SubmissionState::UploadingMedia { index: 0, total: 3 },
                SubmissionState::UploadingMedia { index: 1, total: 3 },
                SubmissionState::UploadingMedia { index: 2, total: 3 },
            ]
        );
    }
}
