use ascent_core::Config;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot path such as remote.base_url, outbox.max_attempts,
        /// activity.session_history_cap or prompt.recent_trail
        key: String,
    },
    /// Change one setting and write config.toml
    Set {
        /// Dot path, as for `get`
        key: String,
        /// New value. An empty string clears remote.base_url, remote.token
        /// or curriculum_path
        value: String,
    },
    /// Print every setting
    List {
        /// JSON instead of the TOML written to disk
        #[arg(long)]
        json: bool,
    },
    /// Print where config.toml lives (honours ASCENT_HOME and ASCENT_ENV)
    Path,
    /// Restore defaults
    Reset {
        /// Keep the [remote] endpoint and token
        #[arg(long)]
        keep_remote: bool,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            let stored = config.get(&key).unwrap_or_default();
            println!("{key} = {stored}");
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset { keep_remote } => {
            let mut config = Config::default();
            if keep_remote {
                config.remote = Config::load()?.remote;
            }
            config.save()?;
            tracing::info!(keep_remote, "config reset to defaults");
            println!("config reset to defaults");
        }
    }
    Ok(())
}
