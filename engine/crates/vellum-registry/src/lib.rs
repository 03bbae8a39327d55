//! Vellum 句柄注册表
//!
//! 为上层子系统（图片、字体等）提供两块基础设施：
//!
//! # HandleRegistry
//! 每个实例只存放一种资源，对外发放 64 位不透明句柄 `{type, slot, generation}`，
//! 查找时做类型、范围和代际三重校验。存储只增不减，销毁时对每条记录调用一次 [`Dispose`]。
//!
//! # HashIndex
//! u64 键到不透明值的开放寻址表，负载因子达到 0.75 时翻倍并重新散列。
//! 典型用途是字体里 “非 ASCII 码点 -> 字形图片句柄” 的稀疏缓存。
//!
//! 两者都是单线程结构，跨线程使用需要调用方自行加锁。

pub mod error;
pub mod handle;
pub mod handle_registry;
pub mod hash_index;

pub use error::RegistryError;
pub use handle::{Handle, HandleType};
pub use handle_registry::{Dispose, HandleRegistry};
pub use hash_index::HashIndex;
