use crate::error::AclError;

/// Storage for the qualifiers handed to `acl_set_qualifier()` while encoding.
///
/// The native library is allowed to keep a pointer to the qualifier instead of copying it, and
/// freeing the ACL does not free it. One slot per entry index; a slot is either unassigned or
/// owns exactly one heap cell, so clearing frees precisely the cells that were assigned.
///
/// Must outlive every native ACL encoded with it.
#[derive(Debug)]
pub(crate) struct QualifierArena {
    slots: Vec<Option<Box<u32>>>,
}

impl QualifierArena {
    /// Arena with `count` unassigned slots.
    pub(crate) fn with_slots(count: usize) -> Result<QualifierArena, AclError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|_| AclError::AllocationError("qualifier slots"))?;
        slots.resize_with(count, || None);
        Ok(QualifierArena { slots })
    }

    /// Hand ownership of `cell` to slot `index`.
    ///
    /// # Panics
    ///
    /// When `index` is out of range.
    pub(crate) fn assign(&mut self, index: usize, cell: Box<u32>) {
        let slot = &mut self.slots[index];
        debug_assert!(slot.is_none(), "qualifier slot {} assigned twice", index);
        *slot = Some(cell);
    }

    /// Number of slots currently owning a cell.
    #[cfg(test)]
    pub(crate) fn assigned(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Free every assigned cell, leaving all slots unassigned.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> Option<u32> {
        self.slots[index].as_deref().copied()
    }
}

#[test]
fn clear_frees_only_assigned() {
    let mut arena = QualifierArena::with_slots(4).unwrap();
    arena.assign(0, Box::new(10));
    arena.assign(2, Box::new(12));
    assert_eq!(arena.assigned(), 2);
    assert_eq!(arena.get(1), None);
    assert_eq!(arena.get(2), Some(12));

    arena.clear();
    assert_eq!(arena.assigned(), 0);
    assert_eq!(arena.get(0), None);
}
