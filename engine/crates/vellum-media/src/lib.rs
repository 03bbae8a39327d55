//! Vellum 媒体资源层
//!
//! 图片和字体各自持有一个 [`HandleRegistry`](vellum_registry::HandleRegistry)，
//! 由 [`MediaContext`](media_context::MediaContext) 统一创建和销毁，不存在进程级的全局注册表。
//!
//! 字体中的非 ASCII 字形通过 [`HashIndex`](vellum_registry::HashIndex) 按码点缓存。

pub mod asset_manifest;
pub mod font_store;
pub mod image_store;
pub mod media_context;
