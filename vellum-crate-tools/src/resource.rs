use std::{
    env,
    path::{Path, PathBuf},
};

/// 统一资源路径管理
///
/// 所有路径基于工作区根目录（通过 `CARGO_MANIFEST_DIR` 推导）。
///
/// # 使用示例
/// ```ignore
/// let manifest = VellumPath::assets_path("assets.toml");  // assets/assets.toml
/// let relative = VellumPath::resolve(&base_dir, "font.png");
/// ```
pub struct VellumPath {}
// 核心路径
impl VellumPath {
    /// 获取工作区根目录
    pub fn workspace_path() -> PathBuf {
        // 从 vellum-crate-tools 上溯一级
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir.parent().unwrap_or(manifest_dir).to_path_buf()
    }

    /// 获取 `assets/` 目录下的文件路径
    pub fn assets_path(filename: &str) -> PathBuf {
        Self::workspace_path().join("assets").join(filename)
    }
}
// 工具
impl VellumPath {
    /// 相对路径基于 `base_dir` 解析，绝对路径原样返回
    pub fn resolve(base_dir: &Path, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() { path.to_path_buf() } else { base_dir.join(path) }
    }
}
