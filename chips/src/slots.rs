/// Fixed capacity table, an index stays valid until its entry is removed.
pub struct Slots<T, const N: usize> {
    entries: [Option<T>; N],
}

impl<T, const N: usize> Slots<T, N> {
    const VACANT: Option<T> = None;

    pub const fn new() -> Self {
        Self { entries: [Self::VACANT; N] }
    }

    /// Takes the lowest vacant slot
    pub fn insert(&mut self, value: T) -> Option<usize> {
        let index = self.entries.iter().position(Option::is_none)?;
        self.entries[index] = Some(value);
        Some(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        for entry in self.entries.iter_mut() {
            if entry.as_ref().map(|value| !keep(value)).unwrap_or(false) {
                *entry = None;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, const N: usize> Default for Slots<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Slots;

    #[test]
    fn test_stable_indices() {
        let mut slots: Slots<(usize, u32), 3> = Slots::new();
        assert_eq!(slots.insert((1, 6)), Some(0));
        assert_eq!(slots.insert((2, 7)), Some(1));
        assert_eq!(slots.insert((1, 6)), Some(2));
        assert_eq!(slots.insert((3, 8)), None);

        slots.retain(|(owner, _)| *owner != 1);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots.get(0), None);
        assert_eq!(slots.get(1), Some(&(2, 7)));
        assert_eq!(slots.get(3), None);
        assert_eq!(slots.insert((3, 8)), Some(0));
    }

    #[test]
    fn test_reuse_after_release() {
        let mut slots: Slots<usize, 32> = Slots::new();
        for owner in 0..100 {
            for _ in 0..2 {
                assert!(slots.insert(owner).is_some());
            }
            slots.retain(|o| *o != owner);
        }
        assert!(slots.is_empty());
    }
}
