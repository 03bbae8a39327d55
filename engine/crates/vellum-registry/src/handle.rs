use std::fmt;

/// 句柄所属的资源类型（8 bit）
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct HandleType(pub u8);
impl HandleType {
    pub const IMAGE: Self = Self(1);
    pub const FONT: Self = Self(2);
}
impl fmt::Display for HandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 64 位不透明句柄
///
/// ```text
/// ┌──────────────────────────┬────────────────────┬──────────┐
/// │ generation (32)          │ slot index (24)    │ type (8) │
/// └──────────────────────────┴────────────────────┴──────────┘
///  63                      32 31                 8 7        0
/// ```
///
/// 句柄只是弱引用，资源本身归注册表所有。值 `0` 保留为无效句柄。
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Handle(u64);

// new & init
impl Handle {
    pub const NULL: Self = Self(0);

    pub const TYPE_BITS: u32 = 8;
    pub const INDEX_BITS: u32 = 24;
    pub const GENERATION_BITS: u32 = 32;

    const TYPE_MASK: u64 = (1 << Self::TYPE_BITS) - 1;
    const INDEX_MASK: u64 = (1 << Self::INDEX_BITS) - 1;
    const INDEX_SHIFT: u32 = Self::TYPE_BITS;
    const GENERATION_SHIFT: u32 = Self::TYPE_BITS + Self::INDEX_BITS;

    /// 编码句柄，超出位宽的部分会被截断
    #[inline]
    pub const fn new(ty: HandleType, index: u32, generation: u32) -> Self {
        Self(
            (ty.0 as u64 & Self::TYPE_MASK)
                | ((index as u64 & Self::INDEX_MASK) << Self::INDEX_SHIFT)
                | ((generation as u64) << Self::GENERATION_SHIFT),
        )
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}
// getters
impl Handle {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
    #[inline]
    pub const fn handle_type(self) -> HandleType {
        HandleType((self.0 & Self::TYPE_MASK) as u8)
    }
    #[inline]
    pub const fn index(self) -> u32 {
        ((self.0 >> Self::INDEX_SHIFT) & Self::INDEX_MASK) as u32
    }
    #[inline]
    pub const fn generation(self) -> u32 {
        (self.0 >> Self::GENERATION_SHIFT) as u32
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Handle(null)");
        }
        write!(f, "Handle(type={}, index={}, gen={})", self.handle_type(), self.index(), self.generation())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}
