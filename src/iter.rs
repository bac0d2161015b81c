use crate::error::AclError;
use crate::native::AclBackend;
use acl_sys::{ACL_FIRST_ENTRY, ACL_NEXT_ENTRY};

/// Walks the entries of a native ACL front to back.
///
/// The native cursor lives inside the ACL object, so two iterators over the same ACL interfere
/// with each other. Iteration stops after the first error.
pub(crate) struct RawEntries<'a, B: AclBackend> {
    backend: &'a B,
    acl: B::Acl,
    next: Option<i32>,
}

impl<'a, B: AclBackend> RawEntries<'a, B> {
    pub(crate) fn new(backend: &'a B, acl: B::Acl) -> RawEntries<'a, B> {
        RawEntries {
            backend,
            acl,
            next: Some(ACL_FIRST_ENTRY),
        }
    }
}

impl<'a, B: AclBackend> Iterator for RawEntries<'a, B> {
    type Item = Result<B::Entry, AclError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry_id = self.next?;
        match self.backend.get_entry(self.acl, entry_id) {
            Ok(Some(entry)) => {
                self.next = Some(ACL_NEXT_ENTRY);
                Some(Ok(entry))
            }
            Ok(None) => {
                self.next = None;
                None
            }
            Err(err) => {
                self.next = None;
                Some(Err(err))
            }
        }
    }
}
