use std::error::Error;

use cadence_core::storage::Config;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            apply(&mut config, &key, &value)?;
            // Reject schedules the timer would refuse at init.
            config.timer.to_settings().validate()?;
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    match key {
        "cycle-minutes" => config.timer.cycle_minutes = value.parse()?,
        "break-minutes" => config.timer.break_minutes = value.parse()?,
        "total-cycles" => config.timer.total_cycles = value.parse()?,
        "autostart-cycles" => config.timer.auto_start.cycles = value.parse()?,
        "autostart-breaks" => config.timer.auto_start.breaks = value.parse()?,
        "notifications-enabled" => config.notifications.enabled = value.parse()?,
        "notifications-sound" => config.notifications.sound = value.parse()?,
        _ => return Err(format!("unknown key: {key}").into()),
    }
    Ok(())
}
