use std::path::PathBuf;

use clap::Subcommand;

use wayguide_core::{Config, ConfigStore, Position, WaypointStore};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Record a waypoint at the given coordinates
    SetPoint {
        /// Waypoint index (ordering key, gaps allowed)
        index: u32,
        /// Named space the coordinates live in
        space: String,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
        #[arg(allow_hyphen_values = true)]
        z: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        yaw: f32,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pitch: f32,
        /// Override the config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Set the tour title
    SetTitle {
        /// Title text (words are joined with spaces)
        #[arg(required = true)]
        title: Vec<String>,
        /// Override the config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Set one message line of a waypoint
    SetMotd {
        index: u32,
        line: usize,
        /// Line text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
        /// Override the config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show a summary of the tour configuration
    Info {
        /// Override the config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(action: AdminAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AdminAction::SetPoint {
            index,
            space,
            x,
            y,
            z,
            yaw,
            pitch,
            config,
        } => {
            let store = ConfigStore::new(super::config_path(config)?);
            let position = Position {
                space,
                x,
                y,
                z,
                yaw,
                pitch,
            };
            store.set_waypoint(index, position)?;
            println!("waypoint {index} set");
        }
        AdminAction::SetTitle { title, config } => {
            let path = super::config_path(config)?;
            let mut cfg = Config::load_from(&path)?;
            cfg.walk.title = title.join(" ");
            cfg.save_to(&path)?;
            println!("title set to '{}'", cfg.walk.title);
        }
        AdminAction::SetMotd {
            index,
            line,
            text,
            config,
        } => {
            let store = ConfigStore::new(super::config_path(config)?);
            store.set_message_line(index, line, &text.join(" "))?;
            println!("waypoint {index} line {line} set");
        }
        AdminAction::Info { config } => {
            let path = super::config_path(config)?;
            let cfg = Config::load_from(&path)?;
            let store = ConfigStore::new(path);
            let sequence = store.load_sequence()?;

            println!("Tour configuration");
            println!("  title:               {}", cfg.walk.title);
            println!("  waypoints:           {}", sequence.len());
            println!("  fallback motd lines: {}", cfg.walk.motd.len());
            println!("  step delay:          {}s", cfg.walk.step_delay_secs);
            println!("  cooldown:            {}s", cfg.walk.cooldown_secs);
            println!("  freeze movement:     {}", cfg.walk.freeze_movement);
            println!("  block commands:      {}", cfg.walk.block_commands);
            println!("  completion commands: {}", cfg.walk.completion_commands.len());
            println!("Edits apply to the next run or engine reload.");
        }
    }
    Ok(())
}
