//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::controller::MachineSettings;

/// Longest pause accepted on the command line, one week
pub const MAX_DISABLE_MINUTES: u64 = 7 * 24 * 60;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "block-pause")]
#[command(about = "A challenge-gated control for temporarily pausing a blocking feature")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// How long a confirmed toggle disables blocking, in minutes
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..=MAX_DISABLE_MINUTES)
    )]
    pub disable_minutes: u64,

    /// Length of the verification code shown by the challenge
    #[arg(long, default_value = "10")]
    pub code_length: usize,

    /// Show a fresh code after every failed challenge attempt
    #[arg(long)]
    pub regenerate_on_mismatch: bool,

    /// JSON file holding the persisted blocking state (in-memory when omitted)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// How long blocking stays off after a toggle
    pub fn disable_duration(&self) -> Duration {
        Duration::from_secs(self.disable_minutes.saturating_mul(60))
    }

    /// Settings handed to the toggle state machine
    pub fn machine_settings(&self) -> MachineSettings {
        MachineSettings {
            disable_minutes: self.disable_minutes,
            code_length: self.code_length,
            regenerate_on_mismatch: self.regenerate_on_mismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_five_minute_pause() {
        let config = Config::try_parse_from(["block-pause"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.disable_duration(), Duration::from_secs(300));
        assert_eq!(config.log_level(), "info");

        let settings = config.machine_settings();
        assert_eq!(settings.disable_minutes, 5);
        assert_eq!(settings.code_length, 10);
        assert!(!settings.regenerate_on_mismatch);
    }

    #[test]
    fn pause_length_is_bounded() {
        assert!(Config::try_parse_from(["block-pause", "-d", "0"]).is_err());
        assert!(Config::try_parse_from(["block-pause", "-d", "18446744073709551615"]).is_err());

        let longest = MAX_DISABLE_MINUTES.to_string();
        let config = Config::try_parse_from(["block-pause", "-d", longest.as_str()]).unwrap();
        assert_eq!(config.disable_duration(), Duration::from_secs(MAX_DISABLE_MINUTES * 60));
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "block-pause",
            "-d",
            "15",
            "--code-length",
            "6",
            "--regenerate-on-mismatch",
            "--state-file",
            "/tmp/pause.json",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.disable_duration(), Duration::from_secs(900));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.state_file, Some(PathBuf::from("/tmp/pause.json")));
        assert!(config.machine_settings().regenerate_on_mismatch);
        assert_eq!(config.machine_settings().code_length, 6);
    }
}
