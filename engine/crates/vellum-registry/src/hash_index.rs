use crate::error::RegistryError;

#[derive(Clone, Copy, Debug)]
enum Slot<V> {
    Unused,
    Active { key: u64, value: V },
    Erased,
}

/// 探测序列
///
/// 起点为 `key & mask`，之后 `perturb >>= 5; ix = 5 * ix + 1 + perturb`。
/// perturb 移位归零后退化为 `5 * ix + 1 (mod 2^n)`，该序列会遍历所有槽位，
/// 所以只要表里还有 `Unused` 槽，查找一定会终止。
///
/// 查找、插入、重新散列都必须走同一条序列。
struct Probe {
    ix: u64,
    perturb: u64,
    mask: u64,
}
impl Probe {
    const PERTURB_SHIFT: u32 = 5;

    #[inline]
    fn new(key: u64, capacity: usize) -> Self {
        let mask = capacity as u64 - 1;
        Self {
            ix: key & mask,
            perturb: key,
            mask,
        }
    }
}
impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let current = self.ix as usize;
        self.perturb >>= Self::PERTURB_SHIFT;
        self.ix = self.ix.wrapping_mul(5).wrapping_add(1).wrapping_add(self.perturb) & self.mask;
        Some(current)
    }
}

/// u64 键的开放寻址索引
///
/// 值是不透明的 `Copy` 数据（实际使用中通常是另一个 [`Handle`](crate::Handle)）。
/// 容量总是 2 的幂，初始 16；插入前若 `(occupied + 1) / capacity >= 0.75`
/// 就翻倍并重新散列，墓碑（`Erased`）只在重新散列时被回收。
///
/// 销毁时不会对 value 做任何处理，需要的话调用方先自行清理。
pub struct HashIndex<V = u64> {
    slots: Vec<Slot<V>>,
    /// Active 槽位数
    len: usize,
    /// Active + Erased 槽位数，用于计算负载因子
    occupied: usize,
}
// new & init
impl<V: Copy> HashIndex<V> {
    pub const INITIAL_CAPACITY: usize = 16;

    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            slots: Self::alloc_slots(Self::INITIAL_CAPACITY)?,
            len: 0,
            occupied: 0,
        })
    }

    fn alloc_slots(capacity: usize) -> Result<Vec<Slot<V>>, RegistryError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || Slot::Unused);
        Ok(slots)
    }
}
// find
impl<V: Copy> HashIndex<V> {
    /// 找不到时返回 `None`，这不是错误
    pub fn get(&self, key: u64) -> Option<V> {
        self.find_slot(key).map(|ix| match self.slots[ix] {
            Slot::Active { value, .. } => value,
            Slot::Unused | Slot::Erased => unreachable!("find_slot only yields active slots"),
        })
    }

    #[inline]
    pub fn contains_key(&self, key: u64) -> bool {
        self.find_slot(key).is_some()
    }

    fn find_slot(&self, key: u64) -> Option<usize> {
        for ix in Probe::new(key, self.capacity()) {
            match self.slots[ix] {
                Slot::Unused => return None,
                Slot::Active { key: k, .. } if k == key => return Some(ix),
                Slot::Active { .. } | Slot::Erased => {}
            }
        }
        None
    }
}
// insert & remove
impl<V: Copy> HashIndex<V> {
    /// 插入一条记录
    ///
    /// key 已存在时原地替换并返回旧值。只有扩容时申请存储失败才会返回错误，
    /// 此时索引保持插入前的状态。
    pub fn insert(&mut self, key: u64, value: V) -> Result<Option<V>, RegistryError> {
        if let Some(ix) = self.find_slot(key) {
            if let Slot::Active { value: old, .. } = &mut self.slots[ix] {
                return Ok(Some(std::mem::replace(old, value)));
            }
        }

        if (self.occupied + 1) * 4 >= self.capacity() * 3 {
            self.grow()?;
        }

        self.place(key, value);
        Ok(None)
    }

    /// 把槽位标记为 `Erased` 并返回旧值
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let ix = self.find_slot(key)?;
        match std::mem::replace(&mut self.slots[ix], Slot::Erased) {
            Slot::Active { value, .. } => {
                self.len -= 1;
                Some(value)
            }
            Slot::Unused | Slot::Erased => unreachable!("find_slot only yields active slots"),
        }
    }

    /// 放到探测序列上第一个非 Active 的槽位，调用前需保证 key 不在表中
    fn place(&mut self, key: u64, value: V) {
        for ix in Probe::new(key, self.capacity()) {
            match self.slots[ix] {
                Slot::Active { .. } => continue,
                Slot::Unused => self.occupied += 1,
                Slot::Erased => {}
            }
            self.slots[ix] = Slot::Active { key, value };
            self.len += 1;
            return;
        }
    }

    fn grow(&mut self) -> Result<(), RegistryError> {
        let new_capacity = self.capacity() * 2;
        let new_slots = Self::alloc_slots(new_capacity)?;

        log::trace!("hash index: rehash {} -> {} ({} active)", self.capacity(), new_capacity, self.len);
        let old_slots = std::mem::replace(&mut self.slots, new_slots);
        self.len = 0;
        self.occupied = 0;
        for slot in old_slots {
            if let Slot::Active { key, value } = slot {
                self.place(key, value);
            }
        }
        Ok(())
    }
}
// getters
impl<V: Copy> HashIndex<V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 按槽位顺序遍历，顺序与插入顺序无关
    pub fn iter(&self) -> impl Iterator<Item = (u64, V)> + '_ {
        self.slots.iter().filter_map(|slot| match *slot {
            Slot::Active { key, value } => Some((key, value)),
            Slot::Unused | Slot::Erased => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_insert_then_get() {
        let mut index = HashIndex::new().unwrap();
        assert_eq!(index.insert(0x1F600, 7u64).unwrap(), None);

        assert_eq!(index.get(0x1F600), Some(7));
        assert!(index.contains_key(0x1F600));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_get_on_empty() {
        let index = HashIndex::<u64>::new().unwrap();

        for key in [0, 1, 15, 16, 100, u64::MAX, 0xdead_beef] {
            assert_eq!(index.get(key), None);
        }
        assert!(index.is_empty());
        assert_eq!(index.capacity(), 16);
    }

    #[test]
    fn test_rehash_keeps_all_keys() {
        let mut index = HashIndex::new().unwrap();
        index.insert(100, 1u64).unwrap();
        index.insert(5000, 2).unwrap();
        index.insert(99999, 3).unwrap();
        for i in 0..10u64 {
            index.insert(200_000 + i * 37, 1000 + i).unwrap();
        }

        assert_eq!(index.capacity(), 32);
        assert_eq!(index.len(), 13);
        assert_eq!(index.get(100), Some(1));
        assert_eq!(index.get(5000), Some(2));
        assert_eq!(index.get(99999), Some(3));
        for i in 0..10u64 {
            assert_eq!(index.get(200_000 + i * 37), Some(1000 + i));
        }
    }

    #[test]
    fn test_load_factor_stays_below_threshold() {
        let mut index = HashIndex::new().unwrap();

        for key in 0..1000u64 {
            index.insert(key * 7919, key).unwrap();
            assert!(index.occupied * 4 < index.capacity() * 3);
            assert!(index.capacity().is_power_of_two());
        }
        assert_eq!(index.capacity(), 2048);
        assert!((0..1000u64).all(|key| index.get(key * 7919) == Some(key)));
    }

    #[test]
    fn test_colliding_keys() {
        let mut index = HashIndex::new().unwrap();
        // 低 4 位相同，起始槽位一致
        let keys = [1u64, 17, 33, 49, 65];
        for (i, key) in keys.iter().enumerate() {
            index.insert(*key, i as u64).unwrap();
        }

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(index.get(*key), Some(i as u64));
        }
        assert_eq!(index.get(81), None);
    }

    #[test]
    fn test_duplicate_insert_replaces() {
        let mut index = HashIndex::new().unwrap();
        index.insert(42, 1u64).unwrap();

        assert_eq!(index.insert(42, 2).unwrap(), Some(1));
        assert_eq!(index.get(42), Some(2));
        assert_eq!(index.len(), 1);
        assert_eq!(index.iter().count(), 1);
    }

    #[test]
    fn test_remove_leaves_chain_intact() {
        let mut index = HashIndex::new().unwrap();
        for key in [2u64, 18, 34] {
            index.insert(key, key * 10).unwrap();
        }

        assert_eq!(index.remove(18), Some(180));
        assert_eq!(index.remove(18), None);
        assert_eq!(index.get(18), None);
        // 墓碑之后的 key 依然能找到
        assert_eq!(index.get(34), Some(340));
        assert_eq!(index.len(), 2);
        assert_eq!(index.occupied, 3);

        // 重新插入复用墓碑，occupied 不变
        index.insert(18, 7).unwrap();
        assert_eq!(index.get(18), Some(7));
        assert_eq!(index.occupied, 3);
    }

    #[test]
    fn test_rehash_drops_tombstones() {
        let mut index = HashIndex::new().unwrap();
        for key in 0..11u64 {
            index.insert(key, key).unwrap();
        }
        for key in 0..11u64 {
            index.remove(key);
        }
        assert_eq!(index.capacity(), 16);
        assert_eq!(index.occupied, 11);

        for key in 100..104u64 {
            index.insert(key, key).unwrap();
        }

        assert_eq!(index.capacity(), 32);
        assert_eq!(index.len(), 4);
        assert_eq!(index.occupied, 4);
        assert!((0..11u64).all(|key| index.get(key).is_none()));
        assert!((100..104u64).all(|key| index.get(key) == Some(key)));
    }

    #[test]
    fn test_probe_visits_every_slot() {
        for key in [0u64, 5, u64::MAX, 0x8000_0000_0000_0001] {
            let visited: HashSet<usize> = Probe::new(key, 16).take(64).collect();
            assert_eq!(visited.len(), 16);
        }
    }
}
