//! CLI entry point for cloud-tabs.
//!
//! # Usage
//!
//! ```bash
//! # Export iCloud_Tabs.json and iCloud_Tab_Urls.txt into ~/Desktop
//! cloud-tabs ~/Desktop
//!
//! # Also copy the URL list and open the other devices' tabs here
//! cloud-tabs ~/Desktop --clipboard --open
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use cloud_tabs::identity::system_identity;
use cloud_tabs::launcher::SystemOpener;
use cloud_tabs::config::GeneralConfig;
use cloud_tabs::{CloudTabsError, CloudTabsExtractor, Config};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI command to execute
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// Export the tabs into a directory
    Export(ExportArgs),
    /// Show help message
    Help,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ExportArgs {
    output_dir: PathBuf,
    clipboard: bool,
    open: bool,
    include_this_device: bool,
    db_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

/// Parse command line arguments (without the program name)
fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut export = ExportArgs::default();
    let mut output_dir = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--clipboard" | "-c" => export.clipboard = true,
            "--open" | "-o" => export.open = true,
            "--include-this-device" => export.include_this_device = true,
            "--db" => {
                let path = args.next().ok_or("--db requires a path argument")?;
                export.db_path = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = args.next().ok_or("--config requires a path argument")?;
                export.config_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {}", flag)),
            dir => {
                if output_dir.is_some() {
                    return Err(format!("Unexpected extra argument: {}", dir));
                }
                output_dir = Some(PathBuf::from(dir));
            }
        }
    }

    export.output_dir = output_dir.ok_or("Missing output directory")?;
    Ok(Command::Export(export))
}

/// Print help message to stdout
fn print_help() {
    println!("cloud-tabs - Export the Safari tabs of all iCloud devices");
    println!();
    println!("USAGE:");
    println!("    cloud-tabs <OUTPUT_DIR> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --clipboard            Also copy the URL list to the clipboard");
    println!("    -o, --open                 Open the tabs of the other devices in the browser");
    println!("        --include-this-device  With --open, also open this machine's own tabs");
    println!("        --db <PATH>            CloudTabs database");
    println!("                               (default ~/Library/Safari/CloudTabs.db)");
    println!("        --config <PATH>        Configuration file");
    println!("    -h, --help                 Print this help message");
    println!();
    println!("OUTPUT:");
    println!("    <OUTPUT_DIR>/iCloud_Tabs.json      Tabs per device (title, url, sortValue)");
    println!("    <OUTPUT_DIR>/iCloud_Tab_Urls.txt   URLs per device");
}

fn log_subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    )
}

fn init_logging(default_level: &str) {
    log_subscriber(default_level).init();
}

fn load_config(args: &ExportArgs) -> Result<Config, CloudTabsError> {
    let mut config = match &args.config_path {
        Some(path) => Config::try_load_from_path(path)?,
        None => Config::load(),
    };
    if let Some(db_path) = &args.db_path {
        config.source.db_path = db_path.to_string_lossy().to_string();
    }
    if args.clipboard {
        config.export.copy_to_clipboard = true;
    }
    if args.include_this_device {
        config.open.exclude_this_device = false;
    }
    Ok(config)
}

fn run_export(args: &ExportArgs, config: &Config) -> Result<(), CloudTabsError> {
    let extractor = CloudTabsExtractor::from_config(config);
    info!("Reading {:?}", extractor.db_path());

    let report = extractor.export(&args.output_dir, &config.export)?;
    println!();
    println!("iCloud tabs exported to:  {}", display_dir(&args.output_dir));
    println!(
        "    {} tabs from {} devices",
        report.tab_count, report.device_count
    );

    if args.open {
        let identity = system_identity();
        let opened = extractor.open_tabs(
            identity.as_ref(),
            &SystemOpener,
            config.open.exclude_this_device,
        )?;
        println!("    {} tabs opened", opened);
    }
    Ok(())
}

fn display_dir(dir: &Path) -> String {
    format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR)
}

fn main() {
    let command = match parse_args(env::args().skip(1)) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information.");
            process::exit(2);
        }
    };

    let args = match command {
        Command::Help => {
            print_help();
            return;
        }
        Command::Export(args) => args,
    };

    // Scoped subscriber until the configured log level is known.
    let bootstrap = log_subscriber(&GeneralConfig::default().log_level);
    let config = match tracing::subscriber::with_default(bootstrap, || load_config(&args)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    init_logging(&config.general.log_level);
    debug!("Executing export: {:?}", args);

    let exit_code = match run_export(&args, &config) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    debug!("Exiting with code: {}", exit_code);
    process::exit(exit_code);
}
