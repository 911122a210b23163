use anyhow::{Context, Result};
use catalog_client::editor::{parse_list, ListField, MovieAction, TextField};
use catalog_client::models::EditMetadataRequest;
use catalog_client::{
    logging, CatalogApi, CatalogError, CatalogView, Config, FixtureLoader, FormController,
    MovieDraft, Resolution, SubmissionState, SubscriptionType, VideoDraft,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "catalog-admin")]
#[command(version, author = "TigreRoll")]
#[command(about = "Admin tool for the movie/TV catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to catalog-client.toml or the environment)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Allow show episodes without a video
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all movies
    Movies,
    /// List all TV shows
    Shows,
    /// Show one movie
    Movie { id: String },
    /// Show one TV show with its seasons and episodes
    Show { id: String },
    /// Upload a new movie: metadata first, then the video file
    AddMovie {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        genres: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        actors: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        directors: String,
        #[arg(long)]
        video: PathBuf,
    },
    /// Upload a new TV show described by a JSON fixture
    AddShow {
        #[arg(long)]
        fixture: PathBuf,
    },
    /// Delete a movie
    DeleteMovie { uuid: String },
    /// Delete a show, a season, or a single episode
    DeleteShow {
        uuid: String,
        #[arg(long)]
        season: Option<u64>,
        #[arg(long, requires = "season")]
        episode: Option<u64>,
    },
    /// Print the stream URL of a movie
    WatchMovie {
        uuid: String,
        #[arg(long, default_value = "1920:1080")]
        resolution: Resolution,
    },
    /// Print the stream URL of an episode
    WatchEpisode {
        uuid: String,
        #[arg(long)]
        season: u64,
        #[arg(long)]
        episode: u64,
        #[arg(long, default_value = "1920:1080")]
        resolution: Resolution,
    },
    /// Subscribe a user to an actor, director or genre
    Subscribe {
        #[arg(long)]
        user: String,
        /// actor, director or genre
        #[arg(long)]
        kind: SubscriptionType,
        #[arg(long)]
        target: String,
    },
    /// Remove a subscription
    Unsubscribe { subscription_id: String },
    /// Review a movie or show
    Review {
        #[arg(long)]
        user: String,
        #[arg(long)]
        target: String,
        /// 1 to 5
        #[arg(long)]
        grade: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Queue a metadata edit for a movie, show, season or episode
    EditMetadata {
        target: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        genres: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        actors: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        directors: String,
        #[arg(long)]
        season: Option<u64>,
        #[arg(long, requires = "season")]
        episode: Option<u64>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<CatalogError>() {
            Some(catalog_error) => eprintln!("❌ {}", catalog_error.user_message()),
            None => eprintln!("❌ {:#}", e),
        }
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if cli.lenient {
        config.upload.strict_video_check = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    logging::init(&config.logging);

    let api = CatalogApi::from_config(&config).context("Failed to create API client")?;
    let mut view = CatalogView::new(api.clone());
    let progress = Arc::new(|state: &SubmissionState| {
        if let SubmissionState::UploadingMedia { .. } = state {
            info!("⏳ {}", state);
        }
    });

    match cli.command {
        Commands::Movies => {
            let movies = view.refresh_movies().await?;
            if movies.is_empty() {
                info!("📭 No movies found");
            }
            for movie in movies {
                println!("{}  {}  [{}]", movie.id, movie.title, movie.genres.join(", "));
            }
        }

        Commands::Shows => {
            let shows = view.refresh_shows().await?;
            if shows.is_empty() {
                info!("📭 No shows found");
            }
            for show in shows {
                println!("{}  {}  ({} seasons)", show.id, show.title, show.seasons.len());
            }
        }

        Commands::Movie { id } => {
            let movie = view.movie(&id).await?;
            println!("{}", serde_json::to_string_pretty(&movie)?);
        }

        Commands::Show { id } => {
            let show = view.show(&id).await?;
            println!("{}", serde_json::to_string_pretty(&show)?);
        }

        Commands::AddMovie {
            title,
            description,
            genres,
            actors,
            directors,
            video,
        } => {
            let video = VideoDraft::from_path(&video)
                .await
                .with_context(|| format!("Cannot read video {}", video.display()))?;

            let mut draft = MovieDraft::new()
                .apply(MovieAction::SetField {
                    field: TextField::Title,
                    value: title,
                })?
                .apply(MovieAction::SetField {
                    field: TextField::Description,
                    value: description,
                })?;
            for (field, raw) in [
                (ListField::Genres, genres),
                (ListField::Actors, actors),
                (ListField::Directors, directors),
            ] {
                if !raw.is_empty() {
                    draft = draft.apply(MovieAction::SetListField { field, raw })?;
                }
            }
            let draft = draft.apply(MovieAction::AttachVideo(video))?;

            let form = FormController::new(draft)
                .with_progress(progress)
                .on_success(|outcome| {
                    let id = outcome.created_id.as_deref().unwrap_or("(id not returned)");
                    info!("🎉 Movie created: {}", id);
                });
            let outcome = form.submit(&api).await?;
            if let Some(report) = outcome.upload {
                info!("📦 Sent {} bytes", report.bytes_sent);
            }
        }

        Commands::AddShow { fixture } => {
            let loader = FixtureLoader::from_path(&fixture)
                .await
                .with_context(|| format!("Failed to read fixture {}", fixture.display()))?;
            let draft = loader.show_draft().await?;
            info!(
                "📺 {}: {} seasons, {} episodes",
                draft.title,
                draft.seasons.len(),
                draft.episode_count()
            );

            let form = FormController::new(draft)
                .strict(config.upload.strict_video_check)
                .with_progress(progress)
                .on_success(|outcome| {
                    let id = outcome.created_id.as_deref().unwrap_or("(id not returned)");
                    info!("🎉 Show created: {}", id);
                });
            let outcome = form.submit(&api).await?;
            if let Some(report) = outcome.upload {
                info!("📦 Sent {} videos, {} bytes", report.payloads, report.bytes_sent);
            }
        }

        Commands::DeleteMovie { uuid } => {
            view.delete_movie(&uuid).await?;
            info!("✅ Deleted movie {} ({} movies left)", uuid, view.movies().len());
        }

        Commands::DeleteShow {
            uuid,
            season,
            episode,
        } => {
            view.delete_show(&uuid, season, episode).await?;
            info!("✅ Done ({} shows listed)", view.shows().len());
        }

        Commands::WatchMovie { uuid, resolution } => {
            let playback = view.movie_playback(&uuid, resolution).await?;
            println!("{} {}", playback.method, playback.url);
        }

        Commands::WatchEpisode {
            uuid,
            season,
            episode,
            resolution,
        } => {
            let playback = view
                .episode_playback(&uuid, season, episode, resolution)
                .await?;
            if let Some(found) = playback.episode(season, episode) {
                info!("▶️  {} S{}E{}: {}", playback.record.title, season, episode, found.title);
            }
            println!("{} {}", playback.method, playback.url);
        }

        Commands::Subscribe { user, kind, target } => {
            view.subscribe(&user, kind, &target).await?;
            info!("✅ {} subscribed to {} {}", user, kind, target);
        }

        Commands::Unsubscribe { subscription_id } => {
            view.unsubscribe(&subscription_id).await?;
            info!("✅ Subscription {} removed", subscription_id);
        }

        Commands::Review {
            user,
            target,
            grade,
            comment,
        } => {
            view.review(&user, &target, grade, &comment).await?;
            info!("✅ Review submitted");
        }

        Commands::EditMetadata {
            target,
            title,
            description,
            genres,
            actors,
            directors,
            season,
            episode,
        } => {
            view.request_metadata_edit(&EditMetadataRequest {
                target_id: target,
                title,
                description,
                genres: parse_list(&genres),
                actors: parse_list(&actors),
                directors: parse_list(&directors),
                season_number: season,
                episode_number: episode,
            })
            .await?;
        }

        Commands::Config => {
            println!("{}", config.summary());
        }
    }

    Ok(())
}
