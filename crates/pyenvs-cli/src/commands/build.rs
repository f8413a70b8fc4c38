use std::path::PathBuf;

use pyenvs_build::{BuildLayout, Builder};
use pyenvs_core::{ImageKind, git_commit, release};

use super::{Context, failures};

pub struct BuildArgs {
    pub images: Vec<String>,
    pub rolling: bool,
    pub push: bool,
    pub build_path: Option<PathBuf>,
    pub keep_going: bool,
}

/// Regenerate sources, build the selected images, then push them.
///
/// Pushing only starts once every build succeeded.
pub async fn build(ctx: &Context, args: BuildArgs) -> anyhow::Result<()> {
    let config = ctx.load_config()?;

    let images = if !args.images.is_empty() {
        config.images.select(&args.images)?
    } else if args.rolling {
        config.images.filter(Some(ImageKind::Rolling), None)
    } else {
        config.images
    };

    let build_path = ctx.build_path(args.build_path);
    let layout = BuildLayout::under(&build_path, ctx.templates_dir());
    let release = release(env!("CARGO_PKG_VERSION"), git_commit().as_deref());
    tracing::info!(release = %release, build_path = %build_path.display(), "starting build");

    let builder =
        Builder::new(images, config.repos, layout, release).with_fast_fail(!args.keep_going);

    println!("Generating sources...");
    builder.generate_sources()?;

    println!("Building images...");
    let mut run = builder.build();
    while let Some((ok, image)) = run.next().await {
        if ok {
            println!("- built {}", image.id());
        } else {
            println!("- failed to build {}", image.id());
        }
    }
    run.finish()
        .await
        .map_err(|errors| failures("build images", errors))?;

    if args.push {
        println!("Pushing images...");
        let mut run = builder.push();
        while let Some((ok, tag)) = run.next().await {
            if ok {
                println!("- pushed {tag}");
            } else {
                println!("- failed to push {tag}");
            }
        }
        run.finish()
            .await
            .map_err(|errors| failures("push images", errors))?;
    }

    Ok(())
}
