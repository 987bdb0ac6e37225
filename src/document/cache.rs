//! Fixed-capacity page cache with distance-based replacement

use super::geometry::Rect;

/// Slot dimensions used until a page has been measured, so a failed load
/// never leaves a zero-sized surface behind.
pub const PLACEHOLDER_SIZE: i32 = 100;

/// One cache slot: a loaded page plus its lazily recorded display lists
#[derive(Debug)]
pub struct PageSlot<P, L> {
    /// Page number this slot was last assigned to, `None` when never used
    pub number: Option<i32>,
    /// Device-pixel size at the configured resolution
    pub width: i32,
    pub height: i32,
    /// Page extent at 72 units per inch
    pub media_box: Rect,
    pub page: Option<P>,
    pub content_list: Option<L>,
    pub annot_list: Option<L>,
}

impl<P, L> Default for PageSlot<P, L> {
    fn default() -> Self {
        Self {
            number: None,
            width: 0,
            height: 0,
            media_box: Rect::EMPTY,
            page: None,
            content_list: None,
            annot_list: None,
        }
    }
}

impl<P, L> PageSlot<P, L> {
    /// Whether this slot holds a loaded page
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.page.is_some()
    }

    /// Release lists and page handle; lists go first since they were
    /// recorded from the page.
    pub fn release(&mut self) {
        self.content_list = None;
        self.annot_list = None;
        self.page = None;
    }

    /// Release everything and claim the slot for `number` with placeholder
    /// dimensions.
    pub fn reassign(&mut self, number: i32) {
        self.release();
        self.number = Some(number);
        self.width = PLACEHOLDER_SIZE;
        self.height = PLACEHOLDER_SIZE;
        self.media_box = Rect::EMPTY;
    }
}

/// Page cache addressed by slot index; at most one slot is current.
pub struct PageCache<P, L> {
    slots: Vec<PageSlot<P, L>>,
    current: Option<usize>,
}

impl<P, L> PageCache<P, L> {
    /// Create a cache with `capacity` slots (at least one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(1));
        slots.resize_with(capacity.max(1), PageSlot::default);
        Self {
            slots,
            current: None,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the loaded slot holding `number`
    #[must_use]
    pub fn find(&self, number: i32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_loaded() && slot.number == Some(number))
    }

    /// Pick the slot to reuse for `number`.
    ///
    /// An unloaded slot wins outright; otherwise the loaded page furthest
    /// from `number` is evicted, the first one on ties.
    #[must_use]
    pub fn victim_for(&self, number: i32) -> usize {
        let mut furthest = 0;
        let mut furthest_dist: Option<u32> = None;
        for (idx, slot) in self.slots.iter().enumerate() {
            let Some(cached) = slot.number.filter(|_| slot.is_loaded()) else {
                return idx;
            };
            let dist = cached.abs_diff(number);
            if furthest_dist.is_none_or(|best| dist > best) {
                furthest_dist = Some(dist);
                furthest = idx;
            }
        }
        furthest
    }

    pub fn set_current(&mut self, idx: usize) {
        debug_assert!(idx < self.slots.len());
        self.current = Some(idx);
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&PageSlot<P, L>> {
        self.current.map(|idx| &self.slots[idx])
    }

    pub fn current_mut(&mut self) -> Option<&mut PageSlot<P, L>> {
        self.current.map(|idx| &mut self.slots[idx])
    }

    #[must_use]
    pub fn slot(&self, idx: usize) -> &PageSlot<P, L> {
        &self.slots[idx]
    }

    pub fn slot_mut(&mut self, idx: usize) -> &mut PageSlot<P, L> {
        &mut self.slots[idx]
    }

    /// Page numbers of all loaded slots, in slot order
    #[must_use]
    pub fn resident_pages(&self) -> Vec<i32> {
        self.slots
            .iter()
            .filter(|slot| slot.is_loaded())
            .filter_map(|slot| slot.number)
            .collect()
    }

    /// Release every slot and forget the current page
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.release();
            slot.number = None;
        }
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestCache = PageCache<u32, ()>;

    fn load(cache: &mut TestCache, idx: usize, number: i32) {
        let slot = cache.slot_mut(idx);
        slot.reassign(number);
        slot.page = Some(number as u32);
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(TestCache::new(0).capacity(), 1);
        assert_eq!(TestCache::new(3).capacity(), 3);
    }

    #[test]
    fn unused_slot_is_picked_first() {
        let mut cache = TestCache::new(3);
        load(&mut cache, 0, 10);
        assert_eq!(cache.victim_for(11), 1);
    }

    #[test]
    fn furthest_page_is_evicted() {
        let mut cache = TestCache::new(3);
        load(&mut cache, 0, 4);
        load(&mut cache, 1, 20);
        load(&mut cache, 2, 6);
        assert_eq!(cache.victim_for(5), 1);
        assert_eq!(cache.victim_for(21), 0);
    }

    #[test]
    fn ties_keep_first_encountered_slot() {
        let mut cache = TestCache::new(2);
        load(&mut cache, 0, 3);
        load(&mut cache, 1, 7);
        assert_eq!(cache.victim_for(5), 0);
    }

    #[test]
    fn find_ignores_slots_without_page() {
        let mut cache = TestCache::new(2);
        cache.slot_mut(0).reassign(9);
        assert_eq!(cache.find(9), None);
        cache.slot_mut(0).page = Some(9);
        assert_eq!(cache.find(9), Some(0));
    }

    #[test]
    fn failed_slot_counts_as_unused() {
        let mut cache = TestCache::new(2);
        load(&mut cache, 0, 1);
        cache.slot_mut(1).reassign(50);
        assert_eq!(cache.victim_for(2), 1);
    }

    #[test]
    fn reassign_drops_lists_and_sets_placeholder() {
        let mut cache: PageCache<u32, Vec<u8>> = PageCache::new(1);
        let slot = cache.slot_mut(0);
        slot.page = Some(1);
        slot.content_list = Some(vec![1]);
        slot.annot_list = Some(vec![2]);
        slot.reassign(2);
        assert!(slot.page.is_none());
        assert!(slot.content_list.is_none() && slot.annot_list.is_none());
        assert_eq!((slot.width, slot.height), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
        assert_eq!(slot.number, Some(2));
    }

    #[test]
    fn clear_releases_everything() {
        let mut cache = TestCache::new(2);
        load(&mut cache, 0, 1);
        load(&mut cache, 1, 2);
        cache.set_current(1);
        cache.clear();
        assert!(cache.resident_pages().is_empty());
        assert!(cache.current().is_none());
    }
}
