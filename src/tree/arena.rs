/// Index plus generation. A key whose generation no longer matches its slot is
/// stale and resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaKey {
    index: u32,
    generation: u32,
}

impl ArenaKey {
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Generational slot storage shared by scenes and containers.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> ArenaKey {
        if let Some(index) = self.free_indices.pop() {
            self.slots[index] = Some(value);
            return ArenaKey {
                index: index as u32,
                generation: self.generations[index],
            };
        }

        let index = self.slots.len();
        self.slots.push(Some(value));
        self.generations.push(0);
        ArenaKey {
            index: index as u32,
            generation: 0,
        }
    }

    fn live_index(&self, key: ArenaKey) -> Option<usize> {
        let index = key.index as usize;
        if index >= self.slots.len() || self.generations[index] != key.generation {
            return None;
        }
        Some(index)
    }

    pub fn get(&self, key: ArenaKey) -> Option<&T> {
        self.live_index(key).and_then(|index| self.slots[index].as_ref())
    }

    pub fn get_mut(&mut self, key: ArenaKey) -> Option<&mut T> {
        self.live_index(key)
            .and_then(move |index| self.slots[index].as_mut())
    }

    /// Remove a value, bumping the slot generation so outstanding keys go stale.
    pub fn remove(&mut self, key: ArenaKey) -> Option<T> {
        let index = self.live_index(key)?;
        let removed = self.slots[index].take();
        if removed.is_some() {
            self.generations[index] = self.generations[index].wrapping_add(1);
            self.free_indices.push(index);
        }
        removed
    }

    pub fn contains(&self, key: ArenaKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArenaKey, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|value| {
                (
                    ArenaKey {
                        index: index as u32,
                        generation: self.generations[index],
                    },
                    value,
                )
            })
        })
    }
}
