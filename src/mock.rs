//! In-memory stand-in for libacl that records what the converters do with it.
//!
//! Every handle is checked on use, so touching a freed ACL or freeing it twice panics. Failures
//! are injected per primitive: `fail_on("acl_add_perm", 2)` makes the third `acl_add_perm` call
//! fail with `EIO`.
use crate::error::AclError;
use crate::file::AclKind;
use crate::native::AclBackend;
use acl_sys::{
    ACL_FIRST_ENTRY, ACL_GROUP, ACL_GROUP_OBJ, ACL_MASK, ACL_OTHER, ACL_UNDEFINED_TAG, ACL_USER,
    ACL_USER_OBJ,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::io;

/// Raw `(tag type, perms, qualifier)` as stored "on disk".
pub(crate) type StoredEntry = (i32, u32, u32);

#[derive(Debug, Clone, Copy)]
enum Qualifier {
    Missing,
    Value(u32),
    /// Retained by reference, the way `acl_set_qualifier()` is allowed to.
    Ref(*const u32),
}

#[derive(Debug, Clone, Copy)]
struct MockEntry {
    tag: i32,
    perms: u32,
    qualifier: Qualifier,
}

#[derive(Debug, Default)]
struct MockAcl {
    entries: Vec<MockEntry>,
    cursor: usize,
    passes: usize,
}

#[derive(Debug, Default)]
struct State {
    acls: HashMap<usize, MockAcl>,
    next_handle: usize,
    freed: usize,
    files: HashMap<(CString, AclKind), Vec<StoredEntry>>,
    calls: HashMap<&'static str, usize>,
    fail: Option<(&'static str, usize)>,
    lose_entry_on_second_pass: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    state: RefCell<State>,
}

fn eio() -> io::Error {
    io::Error::from_raw_os_error(libc::EIO)
}

impl MockBackend {
    pub(crate) fn new() -> MockBackend {
        MockBackend::default()
    }

    /// Fail the `nth` (zero-based) call of `func`.
    pub(crate) fn fail_on(self, func: &'static str, nth: usize) -> MockBackend {
        self.state.borrow_mut().fail = Some((func, nth));
        self
    }

    /// Make every ACL yield one entry less from its second pass on.
    pub(crate) fn lose_entry_on_second_pass(self) -> MockBackend {
        self.state.borrow_mut().lose_entry_on_second_pass = true;
        self
    }

    pub(crate) fn with_file(self, path: &str, kind: AclKind, entries: Vec<StoredEntry>) -> Self {
        let key = (CString::new(path).unwrap(), kind);
        self.state.borrow_mut().files.insert(key, entries);
        self
    }

    pub(crate) fn file(&self, path: &str, kind: AclKind) -> Option<Vec<StoredEntry>> {
        let key = (CString::new(path).unwrap(), kind);
        self.state.borrow().files.get(&key).cloned()
    }

    /// Native ACLs allocated and not yet freed.
    pub(crate) fn live(&self) -> usize {
        self.state.borrow().acls.len()
    }

    pub(crate) fn freed(&self) -> usize {
        self.state.borrow().freed
    }

    pub(crate) fn calls(&self, func: &str) -> usize {
        self.state.borrow().calls.get(func).copied().unwrap_or(0)
    }

    /// Count the call, report whether it was chosen to fail.
    fn tick(&self, func: &'static str) -> bool {
        let mut state = self.state.borrow_mut();
        let calls = state.calls.entry(func).or_insert(0);
        let nth = *calls;
        *calls += 1;
        state.fail == Some((func, nth))
    }

    fn check(&self, func: &'static str) -> Result<(), AclError> {
        if self.tick(func) {
            Err(AclError::NativeError { func, err: eio() })
        } else {
            Ok(())
        }
    }

    fn allocate(&self, entries: Vec<MockEntry>) -> usize {
        let mut state = self.state.borrow_mut();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.acls.insert(
            handle,
            MockAcl {
                entries,
                ..MockAcl::default()
            },
        );
        handle
    }

    fn with_entry<T>(&self, (acl, index): (usize, usize), f: impl FnOnce(&mut MockEntry) -> T) -> T {
        let mut state = self.state.borrow_mut();
        let acl = state.acls.get_mut(&acl).expect("use of freed ACL");
        f(&mut acl.entries[index])
    }
}

impl AclBackend for MockBackend {
    type Acl = usize;
    type Entry = (usize, usize);
    type Permset = (usize, usize);

    fn init(&self, count: i32) -> Result<usize, AclError> {
        assert!(count >= 0);
        if self.tick("acl_init") {
            return Err(AclError::AllocationError("native ACL"));
        }
        Ok(self.allocate(Vec::with_capacity(count as usize)))
    }

    fn free(&self, acl: usize) -> Result<(), AclError> {
        let mut state = self.state.borrow_mut();
        state.acls.remove(&acl).expect("ACL freed twice");
        state.freed += 1;
        Ok(())
    }

    fn get_entry(&self, acl: usize, entry_id: i32) -> Result<Option<(usize, usize)>, AclError> {
        self.check("acl_get_entry")?;
        let mut state = self.state.borrow_mut();
        let lose_entry = state.lose_entry_on_second_pass;
        let native = state.acls.get_mut(&acl).expect("use of freed ACL");
        if entry_id == ACL_FIRST_ENTRY {
            native.cursor = 0;
            native.passes += 1;
        }
        let mut len = native.entries.len();
        if lose_entry && native.passes > 1 {
            len = len.saturating_sub(1);
        }
        if native.cursor < len {
            native.cursor += 1;
            Ok(Some((acl, native.cursor - 1)))
        } else {
            Ok(None)
        }
    }

    fn create_entry(&self, acl: &mut usize) -> Result<(usize, usize), AclError> {
        self.check("acl_create_entry")?;
        let mut state = self.state.borrow_mut();
        let native = state.acls.get_mut(acl).expect("use of freed ACL");
        native.entries.push(MockEntry {
            tag: ACL_UNDEFINED_TAG,
            perms: 0,
            qualifier: Qualifier::Missing,
        });
        Ok((*acl, native.entries.len() - 1))
    }

    fn get_tag_type(&self, entry: (usize, usize)) -> Result<i32, AclError> {
        self.check("acl_get_tag_type")?;
        Ok(self.with_entry(entry, |e| e.tag))
    }

    fn set_tag_type(&self, entry: (usize, usize), tag_type: i32) -> Result<(), AclError> {
        self.check("acl_set_tag_type")?;
        match tag_type {
            ACL_USER_OBJ | ACL_USER | ACL_GROUP_OBJ | ACL_GROUP | ACL_MASK | ACL_OTHER => {
                self.with_entry(entry, |e| e.tag = tag_type);
                Ok(())
            }
            _ => Err(AclError::NativeError {
                func: "acl_set_tag_type",
                err: io::Error::from_raw_os_error(libc::EINVAL),
            }),
        }
    }

    fn get_permset(&self, entry: (usize, usize)) -> Result<(usize, usize), AclError> {
        self.check("acl_get_permset")?;
        self.with_entry(entry, |_| ());
        Ok(entry)
    }

    fn get_perm(&self, permset: (usize, usize), perm: u32) -> Result<bool, AclError> {
        self.check("acl_get_perm")?;
        Ok(self.with_entry(permset, |e| e.perms & perm != 0))
    }

    fn add_perm(&self, permset: (usize, usize), perm: u32) -> Result<(), AclError> {
        self.check("acl_add_perm")?;
        self.with_entry(permset, |e| e.perms |= perm);
        Ok(())
    }

    fn get_qualifier(&self, entry: (usize, usize)) -> Result<u32, AclError> {
        self.check("acl_get_qualifier")?;
        match self.with_entry(entry, |e| e.qualifier) {
            Qualifier::Value(id) => Ok(id),
            Qualifier::Ref(ptr) => Ok(unsafe { *ptr }),
            Qualifier::Missing => Err(AclError::NativeError {
                func: "acl_get_qualifier",
                err: io::Error::from_raw_os_error(libc::EINVAL),
            }),
        }
    }

    unsafe fn set_qualifier(
        &self,
        entry: (usize, usize),
        qualifier: *const u32,
    ) -> Result<(), AclError> {
        self.check("acl_set_qualifier")?;
        self.with_entry(entry, |e| e.qualifier = Qualifier::Ref(qualifier));
        Ok(())
    }

    fn get_file(&self, path: &CStr, kind: AclKind) -> io::Result<usize> {
        if self.tick("acl_get_file") {
            return Err(eio());
        }
        let stored = self
            .state
            .borrow()
            .files
            .get(&(path.to_owned(), kind))
            .cloned()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))?;
        let entries = stored
            .into_iter()
            .map(|(tag, perms, id)| MockEntry {
                tag,
                perms,
                qualifier: if tag == ACL_USER || tag == ACL_GROUP {
                    Qualifier::Value(id)
                } else {
                    Qualifier::Missing
                },
            })
            .collect();
        Ok(self.allocate(entries))
    }

    fn set_file(&self, path: &CStr, kind: AclKind, acl: usize) -> io::Result<()> {
        if self.tick("acl_set_file") {
            return Err(eio());
        }
        let mut state = self.state.borrow_mut();
        let stored = state.acls[&acl]
            .entries
            .iter()
            .map(|e| {
                let id = match e.qualifier {
                    Qualifier::Value(id) => id,
                    // Still owned by the caller's arena at this point.
                    Qualifier::Ref(ptr) => unsafe { *ptr },
                    Qualifier::Missing => 0,
                };
                (e.tag, e.perms, id)
            })
            .collect();
        state.files.insert((path.to_owned(), kind), stored);
        Ok(())
    }
}
