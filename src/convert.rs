//! Conversion between [`Acl`] and native ACL objects.
use crate::arena::QualifierArena;
use crate::error::AclError;
use crate::native::{AclBackend, NativeAcl};
use crate::{Acl, Entry, Tag, ACL_EXECUTE, ACL_READ, ACL_WRITE};
use std::io::ErrorKind;

/// Permission bits in the order they are tested and added.
const PERMS: [u32; 3] = [ACL_READ, ACL_WRITE, ACL_EXECUTE];

/// Convert one native entry into an [`Entry`].
///
/// Unknown tag types are rejected rather than silently decoded as [`Tag::Unset`].
pub(crate) fn decode_entry<B: AclBackend>(backend: &B, raw: B::Entry) -> Result<Entry, AclError> {
    let tag_type = backend.get_tag_type(raw)?;
    let tag = Tag::from_tag_type(tag_type).ok_or_else(|| {
        AclError::native(
            "acl_get_tag_type",
            ErrorKind::InvalidData,
            &format!("unrecognized tag type {}", tag_type),
        )
    })?;

    let permset = backend.get_permset(raw)?;
    let mut perms = 0;
    for &perm in &PERMS {
        if backend.get_perm(permset, perm)? {
            perms |= perm;
        }
    }

    let qualifier = if tag.has_qualifier() {
        backend.get_qualifier(raw)?
    } else {
        0
    };

    let entry = Entry::new(tag, qualifier, perms);
    tracing::trace!(entry = %entry, "decoded entry");
    Ok(entry)
}

/// Fill in the freshly created native entry `raw` from `entry`.
///
/// Returns the heap cell holding the qualifier. It is allocated for every entry, but only
/// installed into the native entry for `User` and `Group`; either way the caller owns it and
/// must keep it alive as long as the native ACL. Bits outside `ACL_RWX` are ignored.
pub(crate) fn encode_entry<B: AclBackend>(
    backend: &B,
    entry: &Entry,
    raw: B::Entry,
) -> Result<Box<u32>, AclError> {
    backend.set_tag_type(raw, entry.tag.tag_type())?;

    let permset = backend.get_permset(raw)?;
    for &perm in &PERMS {
        if entry.perms & perm != 0 {
            backend.add_perm(permset, perm)?;
        }
    }

    let cell = Box::new(entry.qualifier);
    if entry.tag.has_qualifier() {
        // On failure `cell` is dropped here, the caller never sees it.
        unsafe { backend.set_qualifier(raw, &*cell)? };
    }
    tracing::trace!(entry = %entry, "encoded entry");
    Ok(cell)
}

/// Convert a whole native ACL, preserving entry order.
///
/// Native ACLs can only be walked forward and have no length query, so the entries are
/// counted in a first pass and converted in a second.
pub(crate) fn decode<B: AclBackend>(native: &NativeAcl<'_, B>) -> Result<Acl, AclError> {
    let mut count = 0;
    for raw in native.raw_iter() {
        raw?;
        count += 1;
    }

    let mut acl = Acl::create(count)?;
    let mut raw_entries = native.raw_iter();
    for index in 0..count {
        let raw = raw_entries.next().ok_or_else(|| {
            AclError::native(
                "acl_get_entry",
                ErrorKind::UnexpectedEof,
                "native ACL lost entries between passes",
            )
        })??;
        acl.put_entry(index, decode_entry(native.backend(), raw)?);
    }
    Ok(acl)
}

/// Build a native ACL from `acl`, one native entry per portable entry, in order.
///
/// Slot `i` of `arena` receives the qualifier cell of entry `i`; `arena` must have exactly
/// `acl.len()` unassigned slots and stays borrowed by the returned native ACL. On failure the
/// partially built native ACL is released and every slot assigned so far is freed.
pub(crate) fn encode<'a, B: AclBackend>(
    backend: &'a B,
    acl: &Acl,
    arena: &'a mut QualifierArena,
) -> Result<NativeAcl<'a, B>, AclError> {
    let mut native = NativeAcl::init(backend, acl.len())?;
    for (index, entry) in acl.iter().enumerate() {
        let encoded = native
            .create_entry()
            .and_then(|raw| encode_entry(backend, entry, raw));
        match encoded {
            Ok(cell) => arena.assign(index, cell),
            Err(err) => {
                drop(native);
                arena.clear();
                return Err(err);
            }
        }
    }
    Ok(native)
}
