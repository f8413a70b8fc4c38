mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{BuildArgs, Context};

#[derive(Parser)]
#[command(
    name = "pyenvs",
    about = "Build, publish, and describe python-environments container images"
)]
#[command(version)]
struct Cli {
    /// Repository root
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Configuration file (default: <root>/environments.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render, build, and optionally push the images
    Build {
        /// Only build these image ids
        #[arg(long, num_args = 1.., conflicts_with = "rolling")]
        images: Vec<String>,
        /// Only build rolling images
        #[arg(long)]
        rolling: bool,
        /// Push every tag after a successful build
        #[arg(long)]
        push: bool,
        /// Build output directory (default: <root>/containers/out)
        #[arg(long)]
        build_path: Option<PathBuf>,
        /// Keep building the remaining images after a failure
        #[arg(long)]
        keep_going: bool,
    },
    /// Introspect the built images and write their environment data
    GenerateData {
        /// Data directory (default: <root>/python/.data)
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Only print the names of the files that would be generated
        #[arg(long)]
        list_files: bool,
    },
    /// Download the environment data produced by CI for a commit
    FetchData {
        /// Data directory (default: <root>/python/.data)
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Commit to fetch data for (default: current commit)
        #[arg(long)]
        commit: Option<String>,
        /// Seconds to wait for the artifact; 0 waits forever
        #[arg(long)]
        timeout: Option<u64>,
        /// GitHub repository
        #[arg(long, default_value = pyenvs_data::github::DEFAULT_REPO)]
        repo: String,
    },
    /// Print the environment data of an image
    ShowData {
        /// Image id (eg. debian:12)
        image: String,
        /// Data directory (default: <root>/python/.data)
        #[arg(long)]
        datadir: Option<PathBuf>,
        /// Only print this top-level key
        #[arg(long)]
        key: Option<String>,
    },
    /// Print the published images as a reStructuredText list
    ImageList,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine, a malformed one is not
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => return Err(e.into()),
        _ => {}
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="an unset or invalid RUST_LOG falls back to warnings only"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!("Exiting...");
            Ok(())
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::new(cli.root, cli.config);

    match cli.command {
        Commands::Build {
            images,
            rolling,
            push,
            build_path,
            keep_going,
        } => {
            commands::build(
                &ctx,
                BuildArgs {
                    images,
                    rolling,
                    push,
                    build_path,
                    keep_going,
                },
            )
            .await?
        }
        Commands::GenerateData { outdir, list_files } => {
            commands::generate_data(&ctx, outdir, list_files).await?
        }
        Commands::FetchData {
            outdir,
            commit,
            timeout,
            repo,
        } => commands::fetch_data(&ctx, outdir, commit, timeout, &repo).await?,
        Commands::ShowData {
            image,
            datadir,
            key,
        } => commands::show_data(&ctx, &image, datadir, key.as_deref())?,
        Commands::ImageList => commands::image_list(&ctx)?,
    }

    Ok(())
}
