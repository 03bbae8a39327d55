use crate::error::RegistryError;
use crate::handle::{Handle, HandleType};

/// 资源的销毁逻辑
///
/// 注册表销毁时，对每条仍然存活的记录按槽位升序调用一次。
pub trait Dispose {
    fn dispose(&mut self);
}

/// 池中的一条记录，句柄与数据放在一起，用于查找时的代际校验
struct Record<T> {
    handle: Handle,
    value: T,
}

/// 句柄注册表
///
/// 同一种资源的连续存储池，对外发放 [`Handle`]。
///
/// - 初始容量 16，满了之后翻倍，槽位上限 2^24（与句柄中 24 bit 的 index 对应）。
/// - 代际计数器从 1 开始，每次分配加一，到达 `u32::MAX` 后拒绝分配。
/// - 扩容时记录按值搬到新存储的相同下标处，之前发放的句柄依然有效。
/// - 只追加不回收：不支持单独释放某个槽位，整个注册表销毁时统一 dispose。
///
/// `allocate` 返回的可变引用借用了整个注册表，因此不可能跨越下一次 `allocate`
/// 持有它（下一次分配可能触发扩容并搬迁全部记录）。
pub struct HandleRegistry<T: Dispose> {
    handle_type: HandleType,
    next_generation: u32,
    /// 逻辑容量，按翻倍策略增长，与 `records.capacity()` 无关
    capacity: usize,
    slot_limit: usize,
    records: Vec<Record<T>>,
}
// new & init
impl<T: Dispose> HandleRegistry<T> {
    pub const INITIAL_CAPACITY: usize = 16;
    pub const MAX_SLOTS: usize = 1 << Handle::INDEX_BITS;
    /// 计数器到达该值即视为耗尽，该值本身不会被分配出去
    pub const GENERATION_LIMIT: u32 = u32::MAX;

    /// 创建一个空的注册表
    ///
    /// 只有初始存储申请失败时才会返回错误。
    pub fn new(handle_type: HandleType) -> Result<Self, RegistryError> {
        Self::with_slot_limit(handle_type, Self::MAX_SLOTS)
    }

    fn with_slot_limit(handle_type: HandleType, slot_limit: usize) -> Result<Self, RegistryError> {
        let mut records = Vec::new();
        records.try_reserve_exact(Self::INITIAL_CAPACITY)?;

        Ok(Self {
            handle_type,
            next_generation: 1,
            capacity: Self::INITIAL_CAPACITY,
            slot_limit,
            records,
        })
    }
}
// destroy
impl<T: Dispose> HandleRegistry<T> {
    pub fn destroy(mut self) {
        self.destroy_mut();
    }

    /// 按槽位升序 dispose 所有记录，然后释放存储
    ///
    /// 记录在 dispose 时被移出，所以重复调用不会二次 dispose。
    pub fn destroy_mut(&mut self) {
        if self.records.is_empty() {
            return;
        }

        log::debug!("destroy registry type {}: {} records", self.handle_type, self.records.len());
        for mut record in self.records.drain(..) {
            if !record.handle.is_null() {
                record.value.dispose();
            }
        }
        self.records = Vec::new();
        self.capacity = 0;
    }
}
impl<T: Dispose> Drop for HandleRegistry<T> {
    fn drop(&mut self) {
        self.destroy_mut();
    }
}
// allocate
impl<T: Dispose> HandleRegistry<T> {
    /// 分配一条默认值（零初始化）的记录
    pub fn allocate(&mut self) -> Result<(Handle, &mut T), RegistryError>
    where
        T: Default,
    {
        self.push_record(T::default())
    }

    /// 分配一条记录并写入 `value`，失败时 `value` 直接被 drop
    pub fn insert(&mut self, value: T) -> Result<Handle, RegistryError> {
        self.push_record(value).map(|(handle, _)| handle)
    }

    fn push_record(&mut self, value: T) -> Result<(Handle, &mut T), RegistryError> {
        if self.next_generation == Self::GENERATION_LIMIT {
            log::warn!("registry type {}: generation counter exhausted", self.handle_type);
            return Err(RegistryError::GenerationExhausted);
        }

        if self.records.len() >= self.capacity {
            self.grow()?;
        }

        let index = self.records.len();
        let handle = Handle::new(self.handle_type, index as u32, self.next_generation);
        self.next_generation += 1;

        self.records.push(Record { handle, value });
        Ok((handle, &mut self.records[index].value))
    }

    fn grow(&mut self) -> Result<(), RegistryError> {
        if self.capacity >= self.slot_limit {
            log::warn!("registry type {}: slot limit {} reached", self.handle_type, self.slot_limit);
            return Err(RegistryError::CapacityExhausted { limit: self.slot_limit });
        }

        let new_capacity = (self.capacity * 2).max(Self::INITIAL_CAPACITY).min(self.slot_limit);
        self.records.try_reserve_exact(new_capacity - self.records.len())?;

        log::debug!("registry type {}: grow {} -> {}", self.handle_type, self.capacity, new_capacity);
        self.capacity = new_capacity;
        Ok(())
    }
}
// lookup
impl<T: Dispose> HandleRegistry<T> {
    /// 句柄为空、类型不符、下标越界或代际不符时返回 `InvalidHandle`
    pub fn lookup(&self, handle: Handle) -> Result<&T, RegistryError> {
        let index = self.validate(handle)?;
        Ok(&self.records[index].value)
    }

    pub fn lookup_mut(&mut self, handle: Handle) -> Result<&mut T, RegistryError> {
        let index = self.validate(handle)?;
        Ok(&mut self.records[index].value)
    }

    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        self.validate(handle).is_ok()
    }

    fn validate(&self, handle: Handle) -> Result<usize, RegistryError> {
        let index = handle.index() as usize;
        let valid = !handle.is_null()
            && handle.handle_type() == self.handle_type
            && self.records.get(index).is_some_and(|record| record.handle == handle);

        if valid {
            Ok(index)
        } else {
            Err(RegistryError::InvalidHandle {
                handle,
                expected: self.handle_type,
            })
        }
    }
}
// getters
impl<T: Dispose> HandleRegistry<T> {
    #[inline]
    pub fn handle_type(&self) -> HandleType {
        self.handle_type
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 按槽位升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.records.iter().map(|record| (record.handle, &record.value))
    }
}
