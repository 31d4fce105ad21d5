use crate::core::extractor::{list_profiles, run_extraction};
use crate::domain::settings::SETTINGS_FILENAME;
use crate::infra::logger::{print_welcome_message, setup_logger, wait_for_keypress};
use crate::infra::settings_store::load_settings;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unity-extractor")]
#[command(about = "Extract Unity project files into LLM context documents", long_about = None)]
#[command(after_help = "Examples:
  unity-extractor                    Run all enabled profiles
  unity-extractor --profile scripts  Run only the scripts profile
  unity-extractor --list             List available profiles")]
pub struct Cli {
    /// Run a single profile, even if it is disabled
    #[arg(short, long)]
    pub profile: Option<String>,

    /// List available profiles and exit
    #[arg(short, long)]
    pub list: bool,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Settings file (defaults to unity_extractor_settings.json in the project root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> anyhow::Result<()> {
    let interactive = std::env::args_os().len() == 1;
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;
    print_welcome_message()?;

    let project_root = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let config_path = cli
        .config
        .unwrap_or_else(|| project_root.join(SETTINGS_FILENAME));
    debug!(
        "Command parameters: path={}, config={}, profile={:?}, list={}",
        project_root.display(),
        config_path.display(),
        cli.profile,
        cli.list
    );

    let settings = load_settings(&config_path);
    if cli.list {
        list_profiles(&settings)?;
    } else {
        let reports = run_extraction(&project_root, &settings, cli.profile.as_deref(), Local::now())?;
        info!("{} profiles completed", reports.len());
    }

    if interactive {
        wait_for_keypress()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "unity-extractor",
            "-p",
            "scripts",
            "--path",
            "./Game",
            "--config",
            "settings.json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.profile.as_deref(), Some("scripts"));
        assert_eq!(cli.path, Some(PathBuf::from("./Game")));
        assert_eq!(cli.config, Some(PathBuf::from("settings.json")));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.list);
    }

    #[test]
    fn test_cli_defaults_and_list() {
        let cli = Cli::try_parse_from(["unity-extractor"]).unwrap();
        assert!(cli.profile.is_none());
        assert!(cli.path.is_none());
        assert_eq!(cli.verbose, 0);

        let cli = Cli::try_parse_from(["unity-extractor", "--list"]).unwrap();
        assert!(cli.list);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["unity-extractor", "--bogus"]).is_err());
    }
}
