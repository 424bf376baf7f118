use anyhow::{bail, Context, Result};
use clap::Parser;
use depth_lens_core::{
    config::Config,
    depth_map,
    init,
    model::ModelChoice,
    ui::result_summary,
    DepthLens,
    RequestState,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to estimate depth for. Opens the window when omitted.
    image: Option<PathBuf>,

    /// Override the model defined in .env (deeplearning or naive).
    /// The window prefers the model remembered from its last submission.
    #[arg(short, long)]
    model: Option<ModelChoice>,

    /// Override the depth service base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Save the returned depth map to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Open the window even when an image is given
    #[arg(long, default_value_t = false)]
    gui: bool,
}

fn main() -> Result<()> {
    // Setup
    init();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    // Load config and apply CLI overrides
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = args.api_url {
        let mut builder = Config::builder()
            .with_api_url(url)
            .with_model(config.default_model);
        if let Some(timeout) = config.timeout {
            builder = builder.with_timeout(timeout);
        }
        config = builder.build().context("Invalid --api-url")?;
    }
    if let Some(m) = args.model {
        config.default_model = m;
    }

    debug!(
        api_url = %config.api_url,
        model = %config.default_model,
        timeout = ?config.timeout,
        "configuration loaded"
    );

    let app = DepthLens::with_config(config);
    match args.image {
        Some(image) if !args.gui => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to create async runtime")?;
            runtime.block_on(estimate(&app, image, args.output))
        }
        // The window must own the main thread and brings its own runtime.
        image => app
            .run_interactive(image)
            .context("Failed to run the depth viewer"),
    }
}

/// Headless run: upload one image and report the result.
async fn estimate(app: &DepthLens, image: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut session = app.session().context("Failed to create depth client")?;
    session
        .select_path(&image)
        .with_context(|| format!("Failed to read {}", image.display()))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Estimating depth with {}...", session.model().label()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let state = session.run_submit().await.clone();
    spinner.finish_and_clear();

    let result = match state {
        RequestState::Succeeded(result) => result,
        RequestState::Failed(message) => {
            error!(image = %image.display(), "depth estimation failed");
            bail!(message)
        }
        RequestState::Idle | RequestState::Submitting => bail!("No request was made"),
    };

    println!("{}", result_summary(&result));
    println!("Depth map: {}", result.depth_map);

    if let Some(path) = output {
        let bytes = depth_map::resolve(&result.depth_map, session.client().http())
            .await
            .context("Failed to fetch depth map")?;
        fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("(Saved to {})", path.display());
    }

    Ok(())
}
