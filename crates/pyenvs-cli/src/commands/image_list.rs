use pyenvs_core::{Config, ImageKind};

use super::Context;

/// Print the published images as a reStructuredText bullet list.
pub fn image_list(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    for line in image_list_lines(&config) {
        println!("{line}");
    }
    Ok(())
}

/// One ``- ``<repo>/<name>[:<version>]`` `` item per repo and image.
///
/// Rolling images are listed without a version.
fn image_list_lines(config: &Config) -> Vec<String> {
    config
        .repos
        .iter()
        .flat_map(|repo| {
            config.images.iter().map(move |image| {
                let mut name = format!("{}/{}", repo.base(), image.name());
                if image.kind() != ImageKind::Rolling {
                    name.push(':');
                    name.push_str(image.version());
                }
                format!("- ``{name}``")
            })
        })
        .collect()
}
