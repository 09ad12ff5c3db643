use std::path::{Path, PathBuf};

use ascent_core::activity::{ActivityEvent, ActivityTracker};
use ascent_core::prompt::{PromptBuilder, PromptInput};
use ascent_core::remote::{LifeContextSource, UserId};
use ascent_core::{Config, Curriculum, LifeContext};
use chrono::Utc;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ContextAction {
    /// Replay recorded activity and print the assistant prompt
    Build {
        /// JSON array of activity events (navigate, scroll, click, hover, tick)
        #[arg(long)]
        events: PathBuf,
        /// Life context JSON; fetched from the remote when --user is given instead
        #[arg(long)]
        life_context: Option<PathBuf>,
        /// Why the assistant was opened
        #[arg(long)]
        trigger: Option<String>,
        /// Curriculum TOML; defaults to `curriculum_path` from config
        #[arg(long)]
        curriculum: Option<PathBuf>,
        /// Print section names instead of the prompt
        #[arg(long)]
        sections: bool,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid JSON in {}: {e}", path.display()).into())
}

fn load_curriculum(
    explicit: Option<&Path>,
    config: &Config,
) -> Result<Curriculum, Box<dyn std::error::Error>> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.curriculum_path.as_ref().map(PathBuf::from));
    match path {
        Some(path) => Ok(Curriculum::load(&path)?),
        None => {
            tracing::warn!("no curriculum configured, prompt will list no modules");
            Ok(Curriculum::default())
        }
    }
}

fn load_life_context(
    file: Option<&Path>,
    user: Option<&str>,
    config: &Config,
) -> Result<Option<LifeContext>, Box<dyn std::error::Error>> {
    if let Some(path) = file {
        return Ok(Some(read_json(path)?));
    }
    let Some(user) = user else {
        return Ok(None);
    };
    let remote = super::http_remote(config)?;
    match remote.life_context(&UserId::new(user)) {
        Ok(ctx) => Ok(ctx),
        Err(e) => {
            tracing::warn!(error = %e, "life context unavailable, building without it");
            Ok(None)
        }
    }
}

pub fn run(action: ContextAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ContextAction::Build {
            events,
            life_context,
            trigger,
            curriculum,
            sections,
        } => {
            let config = Config::load()?;
            let curriculum = load_curriculum(curriculum.as_deref(), &config)?;
            let life_context = load_life_context(life_context.as_deref(), user, &config)?;
            let events: Vec<ActivityEvent> = read_json(&events)?;

            let start = events.first().map_or_else(Utc::now, ActivityEvent::at);
            let mut tracker = ActivityTracker::new(&config.activity, start);
            for event in &events {
                tracker.apply(event);
            }

            let input = PromptInput {
                curriculum: &curriculum,
                life_context: life_context.as_ref(),
                activity: tracker.snapshot(),
                trigger: trigger.as_deref(),
            };
            let builder = PromptBuilder::new(config.prompt.clone());
            if sections {
                for (name, _) in builder.render_sections(&input) {
                    println!("{name}");
                }
            } else {
                println!("{}", builder.build(&input));
            }
        }
    }
    Ok(())
}
