//! CLI argument parsing module
//!
//! This module handles command-line argument parsing and application entry point.

use crate::config::{ArtifactKind, ExtractionConfig};
use crate::cookies::linux::LinuxV10Provider;
use crate::cookies::oracle::JarFileProvider;
use crate::error::Result;
use crate::exit_code;
use crate::extractor::Extractor;
use crate::i18n;
use crate::logging;
use crate::progress::ProgressIndicator;
use crate::sink::{JsonLinesSink, RecordSink};
use crate::utils::FileUtils;
use clap::{Arg, ArgAction, ArgMatches, Command};

const ALL_KINDS: &str = "all";

/// Main entry point for the CLI application
pub fn run() {
    let matches = create_app().get_matches();
    logging::init(matches.get_flag("verbose"));

    if let Err(e) = run_with_args(&matches) {
        eprintln!("chromium-forensics: error: {}", i18n::localize_error(&e));
        std::process::exit(exit_code::exit_code_for_error(&e));
    }
}

/// Run one extraction per requested kind with parsed command line arguments
fn run_with_args(matches: &ArgMatches) -> Result<()> {
    let kinds = parse_kinds(matches)?;
    let config = build_config_from_args(matches)?;
    config.validate()?;

    let show_progress = !matches.get_flag("no-progress");
    let mut extractor =
        Extractor::new(config).with_progress(Box::new(ProgressIndicator::new(show_progress)));
    if let Some(jar_file) = matches.get_one::<String>("jar-file") {
        let provider = JarFileProvider::load(&FileUtils::expand_path(jar_file)?)?;
        extractor = extractor.with_oracle(Box::new(provider));
    } else if matches.get_flag("linux-v10") {
        extractor = extractor.with_oracle(Box::new(LinuxV10Provider::new()));
    }

    let mut sink: Box<dyn RecordSink> = match matches.get_one::<String>("output") {
        Some(output_file) => Box::new(JsonLinesSink::create(&FileUtils::expand_path(
            output_file,
        )?)?),
        None => Box::new(JsonLinesSink::stdout()),
    };

    for kind in kinds {
        extractor.run(kind, sink.as_mut())?;
    }
    Ok(())
}

/// Create the CLI application structure
fn create_app() -> Command {
    Command::new("chromium-forensics")
        .version(crate::VERSION)
        .about(i18n::message("cli-about"))
        .arg(Arg::new("kind")
            .help("Artifact to extract: history, downloads, cookies, bookmarks, extensions or all")
            .value_name("KIND")
            .required(true)
            .index(1))
        .arg(Arg::new("config-root")
            .long("config-root")
            .value_name("DIR")
            .env("CHROMIUM_FORENSICS_CONFIG_ROOT")
            .help("Directory holding the browser folders (default: ~/.config)"))
        .arg(Arg::new("scratch-dir")
            .long("scratch-dir")
            .value_name("DIR")
            .env("CHROMIUM_FORENSICS_SCRATCH_DIR")
            .help("Directory for temporary snapshots (default: system temp dir)"))
        .arg(Arg::new("user")
            .short('u')
            .long("user")
            .value_name("NAME")
            .help("User name recorded in every row (default: $USER)"))
        .arg(Arg::new("browser")
            .short('b')
            .long("browser")
            .value_name("ID")
            .help("Only scan this browser; may be repeated")
            .action(ArgAction::Append))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Write JSON lines to file instead of stdout"))
        .arg(Arg::new("jar-file")
            .long("jar-file")
            .value_name("FILE")
            .help("JSON file with already decrypted cookie values")
            .conflicts_with("linux-v10"))
        .arg(Arg::new("linux-v10")
            .long("linux-v10")
            .help("Decrypt v10 cookie values with the Linux fallback key")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("no-progress")
            .long("no-progress")
            .help("Do not print progress to stderr")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Verbose output")
            .action(ArgAction::SetTrue))
}

fn parse_kinds(matches: &ArgMatches) -> Result<Vec<ArtifactKind>> {
    match matches.get_one::<String>("kind").map(String::as_str) {
        Some(kind) if kind.eq_ignore_ascii_case(ALL_KINDS) => Ok(ArtifactKind::ALL.to_vec()),
        Some(kind) => Ok(vec![kind.parse()?]),
        None => Ok(ArtifactKind::ALL.to_vec()),
    }
}

/// Build configuration from command line arguments
fn build_config_from_args(matches: &ArgMatches) -> Result<ExtractionConfig> {
    let mut config = ExtractionConfig::detect()?;

    if let Some(root) = matches.get_one::<String>("config-root") {
        config.config_root = FileUtils::expand_path(root)?;
    }

    if let Some(scratch) = matches.get_one::<String>("scratch-dir") {
        config.scratch_dir = FileUtils::expand_path(scratch)?;
    }

    if let Some(user) = matches.get_one::<String>("user") {
        config = config.with_username(user.as_str());
    }

    if let Some(browsers) = matches.get_many::<String>("browser") {
        config = config.with_browsers(browsers.cloned().collect());
    }

    Ok(config)
}
