use std::path::PathBuf;

use pyenvs_data::ImageDataCache;

use super::Context;

/// Print the data of `image`, or only its `key` entry.
pub fn show_data(
    ctx: &Context,
    image: &str,
    datadir: Option<PathBuf>,
    key: Option<&str>,
) -> anyhow::Result<()> {
    let datadir = ctx.datadir(datadir);
    let cache = ImageDataCache::load(&datadir)?;
    let data = cache.get(image)?;

    match key {
        Some(key) => {
            let Some(value) = data.get(key) else {
                anyhow::bail!(
                    "no key '{key}' in data of {image}; available: {}",
                    data.keys().collect::<Vec<_>>().join(", ")
                );
            };
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        None => {
            println!("image: {}", data.image);
            println!("manifest: {}", data.manifest);
            println!("{}", serde_json::to_string_pretty(&data.data)?);
        }
    }
    Ok(())
}
