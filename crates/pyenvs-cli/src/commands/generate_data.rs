use std::path::PathBuf;

use anyhow::Context as _;
use pyenvs_build::{Task, run_tasks};
use pyenvs_core::ImageKind;
use pyenvs_data::{data_file, generate_image_data, list_files};
use pyenvs_docker::DockerClient;

use super::{Context, failures};

/// Write the environment data of every non-rolling image.
pub async fn generate_data(
    ctx: &Context,
    outdir: Option<PathBuf>,
    list_only: bool,
) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    // rolling images have no stable id to key their data by
    let images = config.images.filter(None, Some(ImageKind::Rolling));

    if list_only {
        println!("{}", list_files(&images));
        return Ok(());
    }

    let outdir = ctx.datadir(outdir);
    // bind mounts need an absolute source
    let source_dir = std::fs::canonicalize(ctx.root())
        .with_context(|| format!("failed to resolve {}", ctx.root().display()))?;
    let client = DockerClient::new();

    let tasks = images.iter().map(|image| {
        let (client, source_dir) = (&client, &source_dir);
        let tag = image.id();
        let out = data_file(&outdir, image);
        Task::new(image.clone(), async move {
            generate_image_data(client, &tag, source_dir, &out).await
        })
    });

    println!("Generating image data...");
    let mut run = run_tasks(tasks, true);
    while let Some((ok, image)) = run.next().await {
        if ok {
            println!("- generated data for {}", image.id());
        } else {
            println!("- failed to generate data for {}", image.id());
        }
    }
    run.finish()
        .await
        .map_err(|errors| failures("generate image data", errors))
}
