use clap::Parser;
use postsapp::core::config::{self, PostsConfig};
use postsapp::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "postsapp", about = "Terminal client for the PostsApp social network")]
struct Args {
    /// Backend base URL (overrides BACKENDURL and the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Log level written to postsapp.log
    #[arg(long, default_value_t = LevelFilter::Debug)]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to postsapp.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("postsapp.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    log::info!("PostsApp starting up");

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}, falling back to defaults", e);
        PostsConfig::default()
    });
    let resolved = config::resolve(&file_config, args.backend_url.as_deref());

    tui::run(resolved)
}
