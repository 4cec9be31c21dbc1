mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser)]
#[command(
    name = "image-builder",
    version,
    about = "Submit a job package to the image builder and follow the build"
)]
struct Cli {
    /// Builder server base URL (overrides the config file).
    #[arg(long)]
    server: Option<String>,
    /// Image name.
    #[arg(long)]
    name: Option<String>,
    /// Job package: a .py file or an archive.
    #[arg(long, value_name = "PATH")]
    package: Option<PathBuf>,
    /// Space separated image tags.
    #[arg(long)]
    tags: Option<String>,
    /// Space separated modules to import.
    #[arg(long)]
    imports: Option<String>,
    /// Space separated pip requirements.
    #[arg(long)]
    pip: Option<String>,
    /// Space separated apt packages.
    #[arg(long)]
    apt: Option<String>,
    /// RON config file; defaults to ./builder.ron when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Show the debug log and build details.
    #[arg(long)]
    debug: bool,
    /// Offer to build again after each result.
    #[arg(long)]
    interactive: bool,
    /// Do not send the realtime session id with the form.
    #[arg(long)]
    no_sid: bool,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match platform::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("image-builder: {err}");
            return ExitCode::from(2);
        }
    };
    if let Some(server) = cli.server {
        config.server = server;
    }
    if cli.no_sid {
        config.attach_session_id = false;
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    platform::initialize_logging(config.log_destination, level);

    let options = platform::RunOptions {
        config,
        form: platform::FormInput {
            name: cli.name,
            tags: cli.tags,
            imports: cli.imports,
            pip: cli.pip,
            apt: cli.apt,
            package: cli.package,
        },
        show_debug: cli.debug,
        interactive: cli.interactive,
    };

    match platform::run_app(options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("image-builder: {err:#}");
            ExitCode::from(2)
        }
    }
}
