use std::path::Path;

use anyhow::Context;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use vellum_registry::{Dispose, Handle, HandleRegistry, HandleType};

/// 源图中的一块矩形区域
///
/// 使用有符号整数，方便在校验时拒绝清单中写错的负数坐标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}
impl ImageRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// 校验矩形是否完整落在 `width x height` 的图片内，合法时返回无符号的 (x, y, w, h)
    pub fn fit_in(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x = u32::try_from(self.x).ok()?;
        let y = u32::try_from(self.y).ok()?;
        let w = u32::try_from(self.w).ok().filter(|w| *w > 0)?;
        let h = u32::try_from(self.h).ok().filter(|h| *h > 0)?;

        let inside = x < width && y < height && x.checked_add(w)? <= width && y.checked_add(h)? <= height;
        inside.then_some((x, y, w, h))
    }
}

/// 注册表中的图片记录
pub struct Image {
    pixels: RgbaImage,
}
impl Dispose for Image {
    fn dispose(&mut self) {
        // 提前归还像素内存
        self.pixels = RgbaImage::new(0, 0);
    }
}

/// 图片存储
///
/// 所有图片统一转换为 RGBA8 存放。
pub struct ImageStore {
    images: HandleRegistry<Image>,
}
// new & init
impl ImageStore {
    pub fn new() -> anyhow::Result<Self> {
        let images = HandleRegistry::new(HandleType::IMAGE).context("failed to create image registry")?;
        Ok(Self { images })
    }
}
// destroy
impl ImageStore {
    pub fn destroy(self) {
        self.images.destroy();
    }
    pub fn destroy_mut(&mut self) {
        self.images.destroy_mut();
    }
}
// create & load
impl ImageStore {
    /// 把已有的像素数据注册为一张图片
    pub fn create_image(&mut self, pixels: RgbaImage) -> anyhow::Result<Handle> {
        let handle = self.images.insert(Image { pixels }).context("failed to register image")?;
        Ok(handle)
    }

    pub fn load_image(&mut self, path: impl AsRef<Path>) -> anyhow::Result<Handle> {
        let path = path.as_ref();
        let pixels = Self::read_rgba(path)?;

        let handle = self.create_image(pixels)?;
        log::info!("Loaded image {:?} as {:?}", path, handle);
        Ok(handle)
    }

    /// 从一张图集中切出多张图片
    ///
    /// 任意一个矩形不合法时整个调用失败，且不会注册任何图片。
    pub fn load_image_set(&mut self, path: impl AsRef<Path>, rects: &[ImageRect]) -> anyhow::Result<Vec<Handle>> {
        let path = path.as_ref();
        let source = Self::read_rgba(path)?;

        let handles = self.create_image_set(&source, rects).with_context(|| format!("image set {:?}", path))?;
        log::info!("Loaded image set {:?}: {} images", path, handles.len());
        Ok(handles)
    }

    pub fn create_image_set(&mut self, source: &RgbaImage, rects: &[ImageRect]) -> anyhow::Result<Vec<Handle>> {
        if rects.is_empty() {
            anyhow::bail!("invalid arg: rects is empty");
        }

        let (width, height) = source.dimensions();
        let cells = rects
            .iter()
            .enumerate()
            .map(|(i, rect)| {
                rect.fit_in(width, height)
                    .with_context(|| format!("invalid arg: rects[{}] = {:?} outside {}x{}", i, rect, width, height))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        cells
            .into_iter()
            .map(|(x, y, w, h)| self.create_image(image::imageops::crop_imm(source, x, y, w, h).to_image()))
            .collect()
    }

    fn read_rgba(path: &Path) -> anyhow::Result<RgbaImage> {
        let decoded = image::open(path).with_context(|| format!("failed to load image {:?}", path))?;
        Ok(decoded.to_rgba8())
    }
}
// getters
impl ImageStore {
    pub fn image_size(&self, image: Handle) -> anyhow::Result<(u32, u32)> {
        Ok(self.image_pixels(image)?.dimensions())
    }

    pub fn image_pixels(&self, image: Handle) -> anyhow::Result<&RgbaImage> {
        let record = self.images.lookup(image)?;
        Ok(&record.pixels)
    }

    #[inline]
    pub fn contains(&self, image: Handle) -> bool {
        self.images.contains(image)
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}
