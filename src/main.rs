use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docker_swift_updater::config::{self, Credential};
use docker_swift_updater::domain::PatternResolver;
use docker_swift_updater::github::GitHubClient;
use docker_swift_updater::image::DockerBuilder;
use docker_swift_updater::pipeline::ReleasePipeline;
use docker_swift_updater::process::Executor;
use docker_swift_updater::ui;
use docker_swift_updater::vcs::{GitWorkingCopy, WorkingCopy};

#[derive(clap::Parser)]
#[command(
    name = "docker-swift-updater",
    about = "Build, commit and tag the Dockerfile for every new upstream Swift release"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        help = "Branch to check out before reading the Dockerfile (with --list: only tags merged into origin/<branch>)"
    )]
    branch: Option<String>,

    #[arg(short, long, help = "Echo executed commands and their output")]
    verbose: bool,

    #[arg(long, help = "Show the releases that would be built, without building them")]
    dry_run: bool,

    #[arg(long, help = "List local release tags and exit")]
    list: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let executor = Executor::new(args.verbose || config.behavior.verbose);
    let root = std::env::current_dir().context("Cannot determine current directory")?;
    let working_copy = GitWorkingCopy::open(&root, executor);

    if args.list {
        let tags = working_copy.list_merged_tags(args.branch.as_deref())?;
        ui::display_tags(&tags);
        return Ok(());
    }

    // Required before anything touches the network.
    let credential = Credential::from_env()?;
    let resolver = PatternResolver::new(&config.patterns)?;
    let github = GitHubClient::new(&config.upstream.endpoint, credential)?;
    let upstream = github.upstream(&config.upstream);
    let builder = DockerBuilder::new(executor, &root, &config.build.image_tag);
    let pipeline = ReleasePipeline::new(
        &working_copy,
        &builder,
        &upstream,
        &resolver,
        &config.build.recipe,
    );

    if args.dry_run {
        let template = pipeline.load(args.branch.as_deref())?;
        let plan = pipeline.plan(&template)?;
        ui::display_candidates(&plan.current_version, &plan.candidates);
        ui::display_status("Dry run: nothing was built, committed or pushed");
        return Ok(());
    }

    let releases = pipeline.run(args.branch.as_deref())?;
    println!(
        "\n\x1b[32m✓\x1b[0m Released {} tag(s) from {}\n",
        releases.len(),
        upstream.full_name()
    );

    Ok(())
}
