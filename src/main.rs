use clap::Parser;
use openblu::api::ApiClient;
use openblu::credentials::{self, CredentialChain, TerminalPrompt};
use openblu::{app, exit, platform, App, AppError, Cli, Config, Intent};
use std::path::Path;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Checked before anything else so no request is ever made on an
    // unsupported system
    let platform = match platform::detect() {
        Ok(platform) => platform,
        Err(e) => {
            eprintln!("Error: {}, exiting", e);
            std::process::exit(exit::PLATFORM_INVALID);
        }
    };

    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Platform is: '{}'", platform);

    if let Err(e) = ctrlc::set_handler(|| {
        if credentials::prompt_active() {
            restore_terminal();
        }
        eprintln!("\nAborted");
        std::process::exit(exit::INTERRUPTED);
    }) {
        warn!("Could not install Ctrl+C handler: {}", e);
    }

    let code = match run(&cli) {
        Ok(()) => exit::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if let Some(hint) = e.hint() {
                info!("{}", hint);
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}

// rpassword reads from the controlling terminal, not stdin
#[cfg(unix)]
fn restore_terminal() {
    if let Ok(tty) = std::fs::File::open("/dev/tty") {
        if let Err(e) = credentials::restore_echo(&tty) {
            eprintln!("Could not restore terminal echo: {}", e);
        }
    }
}

#[cfg(not(unix))]
fn restore_terminal() {}

fn init_logging(verbose: bool) {
    // Status output goes to stderr so tables on stdout stay pipeable
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,openblu={}", level)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {}", e);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let intent = cli.intent()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // Must work even when an existing config is broken
    if intent == Intent::InitConfig {
        return app::init_config(Path::new(openblu::config::LOCAL_CONFIG_FILE), &mut out);
    }

    let config = Config::discover(cli.config.as_deref())?;
    let client = ApiClient::from_config(&config.api)?;
    let launcher = platform::get_launcher(&config.vpn)?;
    let credentials = CredentialChain::standard(&config.paths.key_file, cli.key.clone());

    App::new(&config, &client, launcher.as_ref(), &credentials, &TerminalPrompt)
        .verbose(cli.verbose)
        .run(intent, &mut out)
}
