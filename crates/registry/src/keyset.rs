//! Bitset over entry keys

use packetmap_core::EntryKey;

/// Set of [`EntryKey`]s stored as a growable bitset
///
/// Keys are allocated densely from zero, so membership is a word index and a
/// mask regardless of which registry an entry belongs to.
#[derive(Clone, Debug, Default)]
pub struct KeySet {
    words: Vec<u64>,
}

impl KeySet {
    const WORD_BITS: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EntryKey) {
        let (word, mask) = Self::locate(key);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= mask;
    }

    pub fn contains(&self, key: EntryKey) -> bool {
        let (word, mask) = Self::locate(key);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Add every key of `other` to this set
    pub fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Keys in ascending order
    pub fn iter(&self) -> impl Iterator<Item = EntryKey> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..Self::WORD_BITS)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| EntryKey((index * Self::WORD_BITS + bit) as u32))
        })
    }

    fn locate(key: EntryKey) -> (usize, u64) {
        (key.index() / Self::WORD_BITS, 1u64 << (key.index() % Self::WORD_BITS))
    }
}

impl PartialEq for KeySet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| self.words.get(i).unwrap_or(&0) == other.words.get(i).unwrap_or(&0))
    }
}

impl Eq for KeySet {}

impl FromIterator<EntryKey> for KeySet {
    fn from_iter<I: IntoIterator<Item = EntryKey>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_key_set() -> impl Strategy<Value = KeySet> {
        prop::collection::vec(0u32..256, 0..32)
            .prop_map(|keys| keys.into_iter().map(EntryKey).collect::<KeySet>())
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = KeySet::new();
        assert!(set.is_empty());
        set.insert(EntryKey(3));
        set.insert(EntryKey(130));
        assert!(set.contains(EntryKey(3)));
        assert!(set.contains(EntryKey(130)));
        assert!(!set.contains(EntryKey(4)));
        assert!(!set.contains(EntryKey(10_000)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![EntryKey(3), EntryKey(130)]);
    }

    #[test]
    fn test_equality_ignores_trailing_words() {
        let mut a = KeySet::new();
        a.insert(EntryKey(1));
        let mut b = a.clone();
        b.union_with(&KeySet { words: vec![0, 0, 0] });
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn union_contains_both(a in arb_key_set(), b in arb_key_set()) {
            let mut union = a.clone();
            union.union_with(&b);
            for key in a.iter().chain(b.iter()) {
                prop_assert!(union.contains(key));
            }
            prop_assert!(union.len() <= a.len() + b.len());
        }

        #[test]
        fn iter_roundtrips(set in arb_key_set()) {
            prop_assert_eq!(set.iter().collect::<KeySet>(), set);
        }
    }
}
