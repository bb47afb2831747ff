use clap::{value_parser, Arg, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use libveto_readout::config::Config;
use libveto_readout::process::process;
use libveto_readout::readout_file::ReadoutFile;
use libveto_readout::scan::scan_plane;
use libveto_readout::status::ProcessStatus;

fn make_template_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config)?;
    let mut file = File::create(path)?;
    file.write_all(yaml_str.as_bytes())?;
    Ok(())
}

fn run_scan(config: &Config, readout_name: &str, plane: usize, half_side: f64, step: f64) -> ExitCode {
    log::info!(
        "Scanning plane {plane} of readout {readout_name} in {}...",
        config.full_readout_path.to_string_lossy()
    );
    let file = match ReadoutFile::read(&config.full_readout_path) {
        Ok(f) => f,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let readout = match file.get(readout_name) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match scan_plane(readout, plane, half_side, step) {
        Ok(scan) => {
            log::info!("number of unique values: {}", scan.channel_to_daq_id.len());
            for (channel, daq_id) in scan.channel_to_daq_id.iter() {
                log::info!("Channel {channel} -> DAQ ID {daq_id}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    // Create a cli
    let matches = Command::new("veto_readout_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(
            Command::new("scan")
                .about("Scan a grid over a plane of the complete readout and list the channels found")
                .arg(
                    Arg::new("readout")
                        .short('r')
                        .long("readout")
                        .help("Name of the readout to scan (defaults to the first configured readout)"),
                )
                .arg(
                    Arg::new("plane")
                        .long("plane")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Index of the plane to scan"),
                )
                .arg(
                    Arg::new("half-side")
                        .long("half-side")
                        .default_value("35.0")
                        .value_parser(value_parser!(f64))
                        .help("Half side of the scanned square (mm)"),
                )
                .arg(
                    Arg::new("step")
                        .long("step")
                        .default_value("0.1")
                        .value_parser(value_parser!(f64))
                        .help("Grid step (mm)"),
                ),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    if let Err(e) = LogWrapper::new(pb_manager.clone(), logger).try_init() {
        eprintln!("Could not create logging/progress: {e}");
        return ExitCode::FAILURE;
    }

    // Parse the cli
    let config_path = match matches.get_one::<String>("path") {
        Some(p) => PathBuf::from(p),
        None => {
            log::error!("A configuration path is required");
            return ExitCode::FAILURE;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        return match make_template_config(&config_path) {
            Ok(()) => {
                log::info!("Done.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to write template config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Config successfully loaded.");

    if let Some(("scan", sub)) = matches.subcommand() {
        let readout_name = sub
            .get_one::<String>("readout")
            .cloned()
            .unwrap_or_else(|| config.readout_names[0].clone());
        let plane = sub.get_one::<usize>("plane").copied().unwrap_or(0);
        let half_side = sub.get_one::<f64>("half-side").copied().unwrap_or(35.0);
        let step = sub.get_one::<f64>("step").copied().unwrap_or(0.1);
        return run_scan(&config, &readout_name, plane, half_side, step);
    }

    log::info!("Geometry Path: {}", config.geometry_path.to_string_lossy());
    log::info!(
        "Micromegas Readout Path: {}",
        config.micromegas_readout_path.to_string_lossy()
    );
    log::info!(
        "Veto Readout Path: {}",
        config.veto_readout_path.to_string_lossy()
    );
    log::info!(
        "Complete Readout Path: {}",
        config.full_readout_path.to_string_lossy()
    );
    match &config.alias_map_path {
        Some(p) => log::info!("Alias Map Path: {}", p.to_string_lossy()),
        None => log::info!("Alias Map Path: default"),
    }
    log::info!("Readouts: {}", config.readout_names.join(", "));

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    if let Ok(style) = ProgressStyle::with_template("{msg:>12} [{bar:40.cyan/blue}] {pos:>3}%") {
        pb.set_style(style);
    }
    let (tx, rx) = std::sync::mpsc::channel::<ProcessStatus>();
    // Spawn the task!
    let handle = std::thread::spawn(move || process(&config, &tx));

    // Blocks until the processing thread drops its sender
    for status in rx.iter() {
        pb.set_message(status.stage.to_string());
        pb.set_position((status.progress * 100.0) as u64);
    }

    let code = match handle.join() {
        Ok(result) => match result {
            Ok(summary) => {
                log::info!(
                    "Successfully generated readout for {} vetoes, merged into {} readouts!",
                    summary.n_vetoes,
                    summary.n_merged_readouts
                );
                if let Some(mc) = summary.monte_carlo {
                    log::info!(
                        "Monte-Carlo: {} of {} points inside a veto",
                        mc.inside,
                        mc.samples
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Readout generation failed with error: {e}");
                ExitCode::FAILURE
            }
        },
        Err(_) => {
            log::error!("Failed to join processing task!");
            ExitCode::FAILURE
        }
    };

    pb.finish();

    log::info!("Done.");
    code
}
