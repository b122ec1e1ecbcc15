//! LRU replacement state for the set-associative cache (spec §3, §4.5).
//!
//! Each set carries an ordered list of way indices: position 0 is the
//! least-recently-used way, the last position is the most-recently-used way.

pub struct LruStack {
    usage: Vec<Vec<usize>>,
}

impl LruStack {
    pub fn new(sets: usize, ways: usize) -> Self {
        let mut usage = Vec::with_capacity(sets);
        for _ in 0..sets {
            usage.push((0..ways).collect());
        }
        Self { usage }
    }

    /// Moves `way` to the MRU position (the end of the set's list).
    pub fn touch(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            stack.remove(pos);
        }
        stack.push(way);
    }

    /// Removes and returns the LRU way (position 0), to be recorded as the
    /// eviction victim at the time of the miss.
    pub fn evict_victim(&mut self, set: usize) -> usize {
        self.usage[set].remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_stack_evicts_way_zero_first() {
        let mut lru = LruStack::new(1, 4);
        assert_eq!(lru.evict_victim(0), 0);
    }

    #[test]
    fn touch_moves_way_to_mru_end() {
        let mut lru = LruStack::new(1, 4);
        lru.touch(0, 0);
        assert_eq!(lru.evict_victim(0), 1);
    }

    #[test]
    fn repeated_touch_keeps_way_at_mru() {
        let mut lru = LruStack::new(1, 3);
        lru.touch(0, 2);
        lru.touch(0, 2);
        assert_eq!(lru.evict_victim(0), 0);
        assert_eq!(lru.evict_victim(0), 1);
    }
}
