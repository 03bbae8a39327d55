use std::collections::TryReserveError;

use thiserror::Error;

use crate::handle::{Handle, HandleType};

/// 注册表与索引的错误
///
/// 除 `InvalidHandle` 外都是永久性错误，重试没有意义。
/// 索引中找不到 key 不是错误，用 `Option` 表达。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// 存储空间申请失败
    #[error("out of memory: {0}")]
    AllocationFailed(#[from] TryReserveError),

    /// 槽位已达上限
    #[error("too many objects (limit {limit})")]
    CapacityExhausted { limit: usize },

    /// 代际计数器耗尽
    #[error("too many handles")]
    GenerationExhausted,

    /// 句柄为空、类型不符或已失效
    #[error("invalid handle {handle} for registry of type {expected}")]
    InvalidHandle { handle: Handle, expected: HandleType },
}
