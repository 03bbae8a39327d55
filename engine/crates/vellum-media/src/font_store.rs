use std::path::Path;

use anyhow::Context;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use vellum_registry::{Dispose, Handle, HandleRegistry, HandleType, HashIndex};

use crate::image_store::{ImageRect, ImageStore};

const ASCII_GLYPH_COUNT: usize = 95;

/// 位图字体中一个字形在字体图上的位置，高度由字体统一指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphDef {
    /// Unicode 码点
    pub glyph: u32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
}

/// 注册表中的字体记录
///
/// 可打印 ASCII（32..128）走定长数组，其余码点放进按需创建的 [`HashIndex`]。
/// 字形图片由 [`ImageStore`] 持有，字体只保存句柄。
pub struct Font {
    ascii_map: [Handle; ASCII_GLYPH_COUNT],
    glyph_map: Option<HashIndex<Handle>>,
    height: u32,
    is_fixed_width: bool,
    x_adjust: i32,
}
impl Default for Font {
    fn default() -> Self {
        Self {
            ascii_map: [Handle::NULL; ASCII_GLYPH_COUNT],
            glyph_map: None,
            height: 0,
            is_fixed_width: false,
            x_adjust: 0,
        }
    }
}
impl Dispose for Font {
    fn dispose(&mut self) {
        self.glyph_map = None;
    }
}
impl Font {
    const ASCII_FIRST: u32 = 32;
    const ASCII_END: u32 = Self::ASCII_FIRST + ASCII_GLYPH_COUNT as u32;

    fn ascii_slot(glyph: u32) -> Option<usize> {
        (Self::ASCII_FIRST..Self::ASCII_END).contains(&glyph).then(|| (glyph - Self::ASCII_FIRST) as usize)
    }

    fn add_glyph(&mut self, glyph: u32, image: Handle) -> anyhow::Result<()> {
        if let Some(slot) = Self::ascii_slot(glyph) {
            self.ascii_map[slot] = image;
            return Ok(());
        }

        let glyph_map = match self.glyph_map.take() {
            Some(glyph_map) => glyph_map,
            None => HashIndex::new().context("failed to create glyph map")?,
        };
        let glyph_map = self.glyph_map.insert(glyph_map);
        if let Some(previous) = glyph_map.insert(glyph as u64, image)? {
            log::warn!("glyph U+{:04X} defined twice, replacing {:?}", glyph, previous);
        }
        Ok(())
    }

    fn glyph_image(&self, glyph: u32) -> Option<Handle> {
        match Self::ascii_slot(glyph) {
            Some(slot) => Some(self.ascii_map[slot]).filter(|image| !image.is_null()),
            None => self.glyph_map.as_ref()?.get(glyph as u64),
        }
    }
}

/// 字体存储
pub struct FontStore {
    fonts: HandleRegistry<Font>,
}
// new & init
impl FontStore {
    pub fn new() -> anyhow::Result<Self> {
        let fonts = HandleRegistry::new(HandleType::FONT).context("failed to create font registry")?;
        Ok(Self { fonts })
    }
}
// destroy
impl FontStore {
    pub fn destroy(self) {
        self.fonts.destroy();
    }
    pub fn destroy_mut(&mut self) {
        self.fonts.destroy_mut();
    }
}
// load
impl FontStore {
    pub fn load_bitmap_font(
        &mut self,
        images: &mut ImageStore,
        path: impl AsRef<Path>,
        glyphs: &[GlyphDef],
        height: i32,
        x_adjust: i32,
    ) -> anyhow::Result<Handle> {
        let path = path.as_ref();
        let sheet = image::open(path).with_context(|| format!("failed to load font sheet {:?}", path))?.to_rgba8();

        let handle = self.create_bitmap_font(images, &sheet, glyphs, height, x_adjust)?;
        log::info!("Loaded bitmap font {:?} as {:?}", path, handle);
        Ok(handle)
    }

    /// 从字体图中切出每个字形并注册为图片
    ///
    /// 超出字体图范围的字形会被跳过，不影响其他字形。
    pub fn create_bitmap_font(
        &mut self,
        images: &mut ImageStore,
        sheet: &RgbaImage,
        glyphs: &[GlyphDef],
        height: i32,
        x_adjust: i32,
    ) -> anyhow::Result<Handle> {
        if glyphs.is_empty() {
            anyhow::bail!("invalid arg: glyphs is empty");
        }
        let font_height = u32::try_from(height).ok().filter(|h| *h > 0).context("invalid arg: height")?;

        let (handle, font) = self.fonts.allocate().context("failed to register font")?;
        font.height = font_height;
        font.x_adjust = x_adjust;

        let (sheet_w, sheet_h) = sheet.dimensions();
        let mut widths = Vec::with_capacity(glyphs.len());
        for def in glyphs {
            let rect = ImageRect::new(def.x, def.y, def.w, height);
            let Some((x, y, w, h)) = rect.fit_in(sheet_w, sheet_h) else {
                log::warn!("glyph U+{:04X} at {:?} outside {}x{} sheet, skipped", def.glyph, rect, sheet_w, sheet_h);
                continue;
            };

            let glyph_image = images.create_image(image::imageops::crop_imm(sheet, x, y, w, h).to_image())?;
            font.add_glyph(def.glyph, glyph_image)?;
            widths.push(w);
        }

        font.is_fixed_width = widths.windows(2).all(|pair| pair[0] == pair[1]);
        log::debug!("font {:?}: {} of {} glyphs loaded", handle, widths.len(), glyphs.len());
        Ok(handle)
    }
}
// getters
impl FontStore {
    pub fn font_height(&self, font: Handle) -> anyhow::Result<u32> {
        Ok(self.fonts.lookup(font)?.height)
    }

    pub fn is_font_fixed_width(&self, font: Handle) -> anyhow::Result<bool> {
        Ok(self.fonts.lookup(font)?.is_fixed_width)
    }

    pub fn font_has_glyph(&self, font: Handle, glyph: u32) -> anyhow::Result<bool> {
        Ok(self.fonts.lookup(font)?.glyph_image(glyph).is_some())
    }

    /// 字形对应的图片句柄，字体里没有该字形时返回 `None`
    pub fn font_glyph_image(&self, font: Handle, glyph: u32) -> anyhow::Result<Option<Handle>> {
        Ok(self.fonts.lookup(font)?.glyph_image(glyph))
    }

    /// 文本宽度：每个存在的字形贡献 `图片宽度 + x_adjust`，缺失的字形忽略
    pub fn text_width(&self, images: &ImageStore, font: Handle, text: &str) -> anyhow::Result<i32> {
        let data = self.fonts.lookup(font)?;

        let width: i32 = text
            .chars()
            .filter_map(|c| data.glyph_image(c as u32))
            .filter_map(|image| images.image_size(image).ok())
            .map(|(w, _)| w as i32 + data.x_adjust)
            .sum();
        Ok(width)
    }

    #[inline]
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use vellum_registry::RegistryError;

    fn sheet() -> RgbaImage {
        RgbaImage::from_pixel(64, 10, Rgba([255, 255, 255, 255]))
    }

    fn glyph(glyph: u32, x: i32, w: i32) -> GlyphDef {
        GlyphDef { glyph, x, y: 0, w }
    }

    fn stores() -> (ImageStore, FontStore) {
        (ImageStore::new().unwrap(), FontStore::new().unwrap())
    }

    #[test]
    fn test_ascii_and_unicode_glyphs() {
        let (mut images, mut fonts) = stores();
        let defs = [glyph('A' as u32, 0, 6), glyph('é' as u32, 6, 6), glyph(0x1F600, 12, 10)];

        let font = fonts.create_bitmap_font(&mut images, &sheet(), &defs, 8, 1).unwrap();

        assert_eq!(font.handle_type(), HandleType::FONT);
        assert_eq!(fonts.font_height(font).unwrap(), 8);
        assert!(fonts.font_has_glyph(font, 'A' as u32).unwrap());
        assert!(fonts.font_has_glyph(font, 'é' as u32).unwrap());
        assert!(fonts.font_has_glyph(font, 0x1F600).unwrap());
        assert!(!fonts.font_has_glyph(font, 'B' as u32).unwrap());
        assert!(!fonts.font_has_glyph(font, 0x4E2D).unwrap());

        let smile = fonts.font_glyph_image(font, 0x1F600).unwrap().unwrap();
        assert_eq!(images.image_size(smile).unwrap(), (10, 8));
        assert_eq!(images.image_count(), 3);
        assert!(!fonts.is_font_fixed_width(font).unwrap());
    }

    #[test]
    fn test_ascii_only_font_has_no_glyph_map() {
        let (mut images, mut fonts) = stores();
        let defs: Vec<_> = ('a'..='e').enumerate().map(|(i, c)| glyph(c as u32, i as i32 * 5, 5)).collect();

        let font = fonts.create_bitmap_font(&mut images, &sheet(), &defs, 10, 0).unwrap();

        assert!(fonts.fonts.lookup(font).unwrap().glyph_map.is_none());
        assert!(fonts.is_font_fixed_width(font).unwrap());
    }

    #[test]
    fn test_out_of_sheet_glyphs_skipped() {
        let (mut images, mut fonts) = stores();
        let defs = [glyph('x' as u32, 0, 4), glyph('y' as u32, 62, 4), glyph('z' as u32, -2, 4)];

        let font = fonts.create_bitmap_font(&mut images, &sheet(), &defs, 10, 0).unwrap();

        assert!(fonts.font_has_glyph(font, 'x' as u32).unwrap());
        assert!(!fonts.font_has_glyph(font, 'y' as u32).unwrap());
        assert!(!fonts.font_has_glyph(font, 'z' as u32).unwrap());
        assert_eq!(images.image_count(), 1);
    }

    #[test]
    fn test_invalid_arguments() {
        let (mut images, mut fonts) = stores();

        assert!(fonts.create_bitmap_font(&mut images, &sheet(), &[], 8, 0).is_err());
        assert!(fonts.create_bitmap_font(&mut images, &sheet(), &[glyph(65, 0, 4)], 0, 0).is_err());
        assert!(fonts.create_bitmap_font(&mut images, &sheet(), &[glyph(65, 0, 4)], -3, 0).is_err());
        assert_eq!(fonts.font_count(), 0);
    }

    #[test]
    fn test_text_width() {
        let (mut images, mut fonts) = stores();
        let defs = [glyph('H' as u32, 0, 6), glyph('i' as u32, 6, 2), glyph('ü' as u32, 8, 5)];
        let font = fonts.create_bitmap_font(&mut images, &sheet(), &defs, 8, 1).unwrap();

        assert_eq!(fonts.text_width(&images, font, "Hi").unwrap(), 7 + 3);
        // 缺失的字形（空格、'?'）不计入宽度
        assert_eq!(fonts.text_width(&images, font, "Hi ü?").unwrap(), 7 + 3 + 6);
        assert_eq!(fonts.text_width(&images, font, "").unwrap(), 0);
    }

    #[test]
    fn test_image_handle_rejected_as_font() {
        let (mut images, fonts) = stores();
        let image = images.create_image(RgbaImage::new(2, 2)).unwrap();

        let err = fonts.font_height(image).unwrap_err();
        assert!(matches!(err.downcast_ref::<RegistryError>(), Some(RegistryError::InvalidHandle { .. })));
    }

    #[test]
    fn test_many_unicode_glyphs_grow_glyph_map() {
        let (mut images, mut fonts) = stores();
        let defs: Vec<_> = (0..40u32).map(|i| glyph(0x3040 + i, (i % 16) as i32 * 4, 4)).collect();

        let font = fonts.create_bitmap_font(&mut images, &sheet(), &defs, 10, 0).unwrap();

        let glyph_map = fonts.fonts.lookup(font).unwrap().glyph_map.as_ref().unwrap();
        assert_eq!(glyph_map.len(), 40);
        assert_eq!(glyph_map.capacity(), 64);
        assert!((0..40u32).all(|i| fonts.font_has_glyph(font, 0x3040 + i).unwrap()));
    }
}
