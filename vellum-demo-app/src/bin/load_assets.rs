//! 资源清单加载示例
//!
//! 用法：`load-assets [manifest.toml]`，默认读取工作区下的 `assets/assets.toml`。

use anyhow::Result;
use std::path::PathBuf;
use vellum_crate_tools::init_log::init_log;
use vellum_crate_tools::resource::VellumPath;
use vellum_media::asset_manifest::AssetManifest;
use vellum_media::media_context::MediaContext;

const SAMPLE_TEXT: &str = "Hello, world!";

fn main() -> Result<()> {
    init_log();

    let manifest_path =
        std::env::args_os().nth(1).map(PathBuf::from).unwrap_or_else(|| VellumPath::assets_path("assets.toml"));
    if !manifest_path.exists() {
        log::warn!("manifest {:?} not found", manifest_path);
        return Ok(());
    }

    let manifest = AssetManifest::from_file(&manifest_path)?;
    let mut ctx = MediaContext::new()?;
    let loaded = ctx.load_manifest(&manifest);

    for (name, handle) in &loaded.images {
        let (w, h) = ctx.images().image_size(*handle)?;
        log::info!("image '{}': {} {}x{}", name, handle, w, h);
    }
    for (name, handles) in &loaded.image_sets {
        log::info!("image set '{}': {} images", name, handles.len());
    }
    for (name, font) in &loaded.fonts {
        log::info!(
            "font '{}': {} height={} fixed_width={} width({:?})={}",
            name,
            font,
            ctx.fonts().font_height(*font)?,
            ctx.fonts().is_font_fixed_width(*font)?,
            SAMPLE_TEXT,
            ctx.text_width(*font, SAMPLE_TEXT)?
        );
    }

    ctx.destroy();
    if loaded.failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} manifest entries failed: {:?}", loaded.failed.len(), loaded.failed)
    }
}
