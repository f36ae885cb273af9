use log::info;
use timeguard_runner::{Boot, BootStatus, RunnerConfig, cancel_on_shutdown};
use timeguard_validator::CancelToken;

fn print_help() {
    eprintln!(
        r#"timeguard - establish a trustworthy clock at boot

USAGE:
    timeguard [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --dry-run           Use a simulated RTC and never reboot
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXIT CODES:
    0   clock valid, or corrected and reboot requested
    2   configuration error
    3   RTC error
    4   time source answer before the lower bound (possible spoofing)
    5   cancelled by signal
    6   retry attempts exhausted
    7   reboot request failed

EXAMPLES:
    # Run with defaults (/etc/timestamp, RTC probe, pool NTP server)
    timeguard

    # Run with config file
    timeguard --config /etc/timeguard.json
"#
    );
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut dry_run = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(BootStatus::ConfigError.exit_code());
                }
                config_path = Some(args[i].clone());
            }
            "--dry-run" => dry_run = true,
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(BootStatus::ConfigError.exit_code());
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            match RunnerConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(BootStatus::ConfigError.exit_code());
                }
            }
        }
        None => RunnerConfig::default(),
    };

    info!("Timestamp: {}", config.timestamp_path.display());
    info!("Time server: {}", config.ntp_server);

    let cancel = CancelToken::new();
    cancel_on_shutdown(cancel.clone());

    let boot = if dry_run {
        info!("Dry run: simulated RTC, reboot is only logged");
        Boot::dry_run(&config, cancel)
    } else {
        Boot::from_config(&config, cancel)
    };

    let status = boot.run().await;
    info!("Finished: {:?}", status);
    std::process::exit(status.exit_code());
}
