use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use vellum_crate_tools::resource::VellumPath;
use vellum_registry::Handle;

use crate::asset_manifest::AssetManifest;
use crate::font_store::{FontStore, GlyphDef};
use crate::image_store::ImageStore;

/// 清单加载结果：名字 -> 句柄
#[derive(Debug, Default)]
pub struct LoadedAssets {
    pub images: HashMap<String, Handle>,
    pub image_sets: HashMap<String, Vec<Handle>>,
    pub fonts: HashMap<String, Handle>,
    /// 加载失败的条目名
    pub failed: Vec<String>,
}

/// 媒体上下文
///
/// 持有图片与字体两个存储，负责它们的创建与销毁顺序。
/// 字体引用图片句柄，因此先销毁字体再销毁图片（字段声明顺序也保证了 drop 时同样的顺序）。
pub struct MediaContext {
    fonts: FontStore,
    images: ImageStore,
}
// new & init
impl MediaContext {
    pub fn new() -> anyhow::Result<Self> {
        let images = ImageStore::new()?;
        let fonts = FontStore::new()?;
        log::info!("media context initialized");

        Ok(Self { fonts, images })
    }
}
// destroy
impl MediaContext {
    pub fn destroy(self) {
        let Self { fonts, images } = self;
        fonts.destroy();
        images.destroy();
        log::info!("media context destroyed");
    }
}
// getters
impl MediaContext {
    #[inline]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }
    #[inline]
    pub fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }
    #[inline]
    pub fn fonts(&self) -> &FontStore {
        &self.fonts
    }
}
// tools
impl MediaContext {
    pub fn load_bitmap_font(
        &mut self,
        path: impl AsRef<Path>,
        glyphs: &[GlyphDef],
        height: i32,
        x_adjust: i32,
    ) -> anyhow::Result<Handle> {
        self.fonts.load_bitmap_font(&mut self.images, path, glyphs, height, x_adjust)
    }

    pub fn create_bitmap_font(
        &mut self,
        sheet: &RgbaImage,
        glyphs: &[GlyphDef],
        height: i32,
        x_adjust: i32,
    ) -> anyhow::Result<Handle> {
        self.fonts.create_bitmap_font(&mut self.images, sheet, glyphs, height, x_adjust)
    }

    pub fn text_width(&self, font: Handle, text: &str) -> anyhow::Result<i32> {
        self.fonts.text_width(&self.images, font, text)
    }

    /// 加载清单中的所有条目
    ///
    /// 单个条目失败只记录日志并跳过，不影响其余条目。
    pub fn load_manifest(&mut self, manifest: &AssetManifest) -> LoadedAssets {
        let mut loaded = LoadedAssets::default();
        let base_dir = manifest.base_dir.as_path();

        for item in &manifest.images {
            match self.images.load_image(VellumPath::resolve(base_dir, &item.path)) {
                Ok(handle) => {
                    loaded.images.insert(item.name.clone(), handle);
                }
                Err(e) => {
                    log::error!("Failed to load image '{}': {:?}", item.name, e);
                    loaded.failed.push(item.name.clone());
                }
            }
        }

        for item in &manifest.image_sets {
            match self.images.load_image_set(VellumPath::resolve(base_dir, &item.path), &item.rects) {
                Ok(handles) => {
                    loaded.image_sets.insert(item.name.clone(), handles);
                }
                Err(e) => {
                    log::error!("Failed to load image set '{}': {:?}", item.name, e);
                    loaded.failed.push(item.name.clone());
                }
            }
        }

        for item in &manifest.bitmap_fonts {
            let path = VellumPath::resolve(base_dir, &item.path);
            match self.load_bitmap_font(path, &item.glyphs, item.height, item.x_adjust) {
                Ok(handle) => {
                    loaded.fonts.insert(item.name.clone(), handle);
                }
                Err(e) => {
                    log::error!("Failed to load bitmap font '{}': {:?}", item.name, e);
                    loaded.failed.push(item.name.clone());
                }
            }
        }

        log::info!(
            "manifest loaded: {} images, {} image sets, {} fonts, {} failed",
            loaded.images.len(),
            loaded.image_sets.len(),
            loaded.fonts.len(),
            loaded.failed.len()
        );
        loaded
    }
}
