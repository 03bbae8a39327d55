use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::font_store::GlyphDef;
use crate::image_store::ImageRect;

/// TOML 资源清单
///
/// ```toml
/// [[images]]
/// name = "logo"
/// path = "logo.png"
///
/// [[image_sets]]
/// name = "tiles"
/// path = "tiles.png"
/// rects = [{ x = 0, y = 0, w = 16, h = 16 }]
///
/// [[bitmap_fonts]]
/// name = "mono"
/// path = "font.png"
/// height = 8
/// x_adjust = 1
/// glyphs = [{ glyph = 65, x = 0, y = 0, w = 6 }]
/// ```
///
/// 相对路径基于清单文件所在目录解析。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub images: Vec<ImageItem>,

    #[serde(default)]
    pub image_sets: Vec<ImageSetItem>,

    #[serde(default)]
    pub bitmap_fonts: Vec<BitmapFontItem>,

    /// 清单所在目录，不参与序列化
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// 单张图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageItem {
    pub name: String,
    pub path: PathBuf,
}

/// 图集，按矩形切分为多张图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSetItem {
    pub name: String,
    pub path: PathBuf,
    pub rects: Vec<ImageRect>,
}

/// 位图字体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitmapFontItem {
    pub name: String,
    pub path: PathBuf,
    pub height: i32,

    /// 字形之间额外的水平间距，默认 0
    #[serde(default)]
    pub x_adjust: i32,

    pub glyphs: Vec<GlyphDef>,
}

impl AssetManifest {
    /// 从 TOML 文件加载清单
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("failed to read manifest {:?}", path))?;

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(&content, base_dir).with_context(|| format!("failed to parse manifest {:?}", path))
    }

    pub fn from_toml_str(content: &str, base_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let mut manifest: AssetManifest = toml::from_str(content)?;
        manifest.base_dir = base_dir.into();
        Ok(manifest)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.image_sets.is_empty() && self.bitmap_fonts.is_empty()
    }
}
