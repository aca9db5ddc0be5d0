use core::{mem, num::NonZeroU32};

/// Index of a node slot in an [`Arena`], stored as `index + 1` so that a missing link costs nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Handle(NonZeroU32);

impl Handle {
    fn new(index: usize) -> Self {
        u32::try_from(index + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Handle)
            .expect("node arena exceeded u32::MAX - 1 slots")
    }

    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

enum Slot<T> {
    Live(T),
    /// Released slot, chained to the next released one.
    Free(Option<Handle>),
}

/// Owns every node of a tree. Released slots are chained through themselves and reused before the
/// slot vector grows, so handles of live nodes never move.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    next_free: Option<Handle>,
    live: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            next_free: None,
            live: 0,
        }
    }

    /// Number of live elements.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        self.live += 1;

        let Some(handle) = self.next_free else {
            self.slots.push(Slot::Live(element));
            return Handle::new(self.slots.len() - 1);
        };

        let slot = &mut self.slots[handle.index()];
        match mem::replace(slot, Slot::Live(element)) {
            Slot::Free(next) => self.next_free = next,
            Slot::Live(_) => unreachable!("free chain points at a live slot"),
        }

        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.index()] {
            Slot::Live(element) => element,
            Slot::Free(_) => panic!("dangling node handle {handle:?}"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.index()] {
            Slot::Live(element) => element,
            Slot::Free(_) => panic!("dangling node handle {handle:?}"),
        }
    }

    /// Moves the element out and puts its slot at the head of the free chain.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.index()];

        match mem::replace(slot, Slot::Free(self.next_free)) {
            Slot::Live(element) => {
                self.next_free = Some(handle);
                self.live -= 1;
                element
            }
            Slot::Free(next) => {
                *slot = Slot::Free(next);
                panic!("dangling node handle {handle:?}")
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.next_free = None;
        self.live = 0;
    }
}
