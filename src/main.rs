mod cli;

use clipserve::{config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting clipserve");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    for tool in clipserve_av::check_tools() {
        if tool.available {
            tracing::info!(
                "Found {} ({})",
                tool.name,
                tool.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("{} not found; requests depending on it will fail", tool.name);
        }
    }

    let ctx = server::AppContext::with_system_runner(config)?;
    server::start_server(ctx).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipserve=trace,clipserve_av=trace,tower_http=debug".to_string()
        } else {
            "clipserve=debug,clipserve_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipserve {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = clipserve_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Tmp dir: {:?}", config.media.tmp_dir);
            println!("  Snapshot dir: {:?}", config.media.snapshot_dir);
            println!("  Output dir: {:?}", config.media.output_dir);
            println!("  Require credentials: {}", config.fetch.require_credentials);
            println!(
                "  Clip bounds: {}-{}s (default {}s)",
                config.clip.min_secs, config.clip.max_secs, config.clip.default_secs
            );
            println!(
                "  Screenshot fallback: {}",
                if config.screenshot.is_some() {
                    "configured"
                } else {
                    "disabled"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
