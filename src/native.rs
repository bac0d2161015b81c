//! The native ACL library as seen by the converters.
//!
//! [`AclBackend`] mirrors the handful of POSIX.1e primitives the conversion needs, with the
//! C status codes already turned into `Result`s. [`Libacl`] drives the real library through
//! `acl-sys`; other implementations may stand in for it (the unit tests use a recording mock).
use crate::arena::QualifierArena;
use crate::error::AclError;
use crate::file::AclKind;
use crate::iter::RawEntries;
use crate::util::{check_pointer, check_return};
use acl_sys::{
    acl_add_perm, acl_create_entry, acl_entry_t, acl_free, acl_get_entry, acl_get_file,
    acl_get_permset, acl_get_qualifier, acl_get_tag_type, acl_init, acl_permset_t,
    acl_set_file, acl_set_qualifier, acl_set_tag_type, acl_t, acl_type_t, ACL_TYPE_ACCESS,
    ACL_TYPE_DEFAULT,
};
use std::convert::TryFrom;
use std::ffi::CStr;
use std::io;
use std::marker::PhantomData;
use std::os::raw::{c_int, c_void};
use std::ptr::null_mut;

// Not declared by acl-sys. Part of libacl, which acl-sys already links.
#[link(name = "acl")]
extern "C" {
    fn acl_get_perm(permset_d: acl_permset_t, perm: u32) -> c_int;
}

/// Primitive operations of a POSIX.1e ACL library.
///
/// Handles are plain copyable values; ownership of an ACL handle is tracked by the caller, which
/// must pass every handle obtained from `init()` or `get_file()` to `free()` exactly once.
/// Entry and permission set handles point into their ACL and die with it.
pub trait AclBackend {
    type Acl: Copy;
    type Entry: Copy;
    type Permset: Copy;

    /// `acl_init`: allocate an empty ACL with room for `count` entries.
    fn init(&self, count: i32) -> Result<Self::Acl, AclError>;
    /// `acl_free`
    fn free(&self, acl: Self::Acl) -> Result<(), AclError>;
    /// `acl_get_entry`: `entry_id` is `ACL_FIRST_ENTRY` or `ACL_NEXT_ENTRY`. `Ok(None)` when
    /// there are no more entries.
    fn get_entry(&self, acl: Self::Acl, entry_id: i32) -> Result<Option<Self::Entry>, AclError>;
    /// `acl_create_entry`: may move the ACL, hence `&mut`.
    fn create_entry(&self, acl: &mut Self::Acl) -> Result<Self::Entry, AclError>;
    fn get_tag_type(&self, entry: Self::Entry) -> Result<i32, AclError>;
    fn set_tag_type(&self, entry: Self::Entry, tag_type: i32) -> Result<(), AclError>;
    fn get_permset(&self, entry: Self::Entry) -> Result<Self::Permset, AclError>;
    /// `acl_get_perm`: whether `perm` is a member of the set.
    fn get_perm(&self, permset: Self::Permset, perm: u32) -> Result<bool, AclError>;
    fn add_perm(&self, permset: Self::Permset, perm: u32) -> Result<(), AclError>;
    /// `acl_get_qualifier`, dereferenced. A null qualifier is an error.
    fn get_qualifier(&self, entry: Self::Entry) -> Result<u32, AclError>;
    /// `acl_set_qualifier`
    ///
    /// # Safety
    ///
    /// The library may retain `qualifier` by reference. It must stay valid until the ACL owning
    /// `entry` has been freed.
    unsafe fn set_qualifier(&self, entry: Self::Entry, qualifier: *const u32)
        -> Result<(), AclError>;
    /// `acl_get_file`. The error is whatever `errno` said when no ACL came back.
    fn get_file(&self, path: &CStr, kind: AclKind) -> io::Result<Self::Acl>;
    /// `acl_set_file`. Does not take ownership of `acl`.
    fn set_file(&self, path: &CStr, kind: AclKind, acl: Self::Acl) -> io::Result<()>;
}

/// The system's libacl.
#[derive(Debug, Clone, Copy, Default)]
pub struct Libacl;

fn acl_type(kind: AclKind) -> acl_type_t {
    match kind {
        AclKind::Access => ACL_TYPE_ACCESS,
        AclKind::Default => ACL_TYPE_DEFAULT,
    }
}

/// Frees a pointer handed out by libacl when going out of scope.
struct AutoPtr<T>(*mut T);

impl<T> Drop for AutoPtr<T> {
    fn drop(&mut self) {
        if self.0.is_null() {
            return;
        }
        let ret = unsafe { acl_free(self.0 as *mut c_void) };
        if ret != 0 {
            tracing::warn!(error = %io::Error::last_os_error(), "acl_free failed");
        }
    }
}

impl AclBackend for Libacl {
    type Acl = acl_t;
    type Entry = acl_entry_t;
    type Permset = acl_permset_t;

    fn init(&self, count: i32) -> Result<acl_t, AclError> {
        let acl = unsafe { acl_init(count) };
        if acl.is_null() {
            return Err(AclError::AllocationError("native ACL"));
        }
        Ok(acl)
    }

    fn free(&self, acl: acl_t) -> Result<(), AclError> {
        check_return(unsafe { acl_free(acl as *mut c_void) }, "acl_free")?;
        Ok(())
    }

    fn get_entry(&self, acl: acl_t, entry_id: i32) -> Result<Option<acl_entry_t>, AclError> {
        let mut entry: acl_entry_t = null_mut();
        // The returned entry is owned by the ACL itself, no need to free it.
        let ret = unsafe { acl_get_entry(acl, entry_id, &mut entry) };
        match check_return(ret, "acl_get_entry")? {
            0 => Ok(None),
            _ => Ok(Some(entry)),
        }
    }

    fn create_entry(&self, acl: &mut acl_t) -> Result<acl_entry_t, AclError> {
        let mut entry: acl_entry_t = null_mut();
        check_return(
            unsafe { acl_create_entry(acl, &mut entry) },
            "acl_create_entry",
        )?;
        Ok(entry)
    }

    fn get_tag_type(&self, entry: acl_entry_t) -> Result<i32, AclError> {
        let mut tag_type: i32 = 0;
        check_return(
            unsafe { acl_get_tag_type(entry, &mut tag_type) },
            "acl_get_tag_type",
        )?;
        Ok(tag_type)
    }

    fn set_tag_type(&self, entry: acl_entry_t, tag_type: i32) -> Result<(), AclError> {
        check_return(
            unsafe { acl_set_tag_type(entry, tag_type) },
            "acl_set_tag_type",
        )?;
        Ok(())
    }

    fn get_permset(&self, entry: acl_entry_t) -> Result<acl_permset_t, AclError> {
        let mut permset: acl_permset_t = null_mut();
        check_return(
            unsafe { acl_get_permset(entry, &mut permset) },
            "acl_get_permset",
        )?;
        Ok(permset)
    }

    fn get_perm(&self, permset: acl_permset_t, perm: u32) -> Result<bool, AclError> {
        let ret = check_return(unsafe { acl_get_perm(permset, perm) }, "acl_get_perm")?;
        Ok(ret > 0)
    }

    fn add_perm(&self, permset: acl_permset_t, perm: u32) -> Result<(), AclError> {
        check_return(unsafe { acl_add_perm(permset, perm) }, "acl_add_perm")?;
        Ok(())
    }

    fn get_qualifier(&self, entry: acl_entry_t) -> Result<u32, AclError> {
        // libacl hands out a copy that has to be freed separately.
        let id = AutoPtr(unsafe { acl_get_qualifier(entry) } as *mut u32);
        check_pointer(id.0, "acl_get_qualifier")?;
        Ok(unsafe { *id.0 })
    }

    unsafe fn set_qualifier(&self, entry: acl_entry_t, qualifier: *const u32) -> Result<(), AclError> {
        check_return(
            acl_set_qualifier(entry, qualifier as *const c_void),
            "acl_set_qualifier",
        )?;
        Ok(())
    }

    fn get_file(&self, path: &CStr, kind: AclKind) -> io::Result<acl_t> {
        let acl = unsafe { acl_get_file(path.as_ptr(), acl_type(kind)) };
        if acl.is_null() {
            Err(io::Error::last_os_error())
        } else {
            Ok(acl)
        }
    }

    fn set_file(&self, path: &CStr, kind: AclKind, acl: acl_t) -> io::Result<()> {
        let ret = unsafe { acl_set_file(path.as_ptr(), acl_type(kind), acl) };
        if ret == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// Owned native ACL handle, released when dropped.
///
/// `'a` also covers the [`QualifierArena`] an encoded ACL may point into, so the arena stays
/// borrowed until the handle is gone.
pub(crate) struct NativeAcl<'a, B: AclBackend> {
    backend: &'a B,
    raw: B::Acl,
    qualifiers: PhantomData<&'a QualifierArena>,
}

impl<'a, B: AclBackend> NativeAcl<'a, B> {
    /// Allocate an empty native ACL sized for `count` entries.
    pub(crate) fn init(backend: &'a B, count: usize) -> Result<Self, AclError> {
        let count =
            i32::try_from(count).map_err(|_| AclError::AllocationError("native ACL"))?;
        let raw = backend.init(count)?;
        Ok(NativeAcl {
            backend,
            raw,
            qualifiers: PhantomData,
        })
    }

    pub(crate) fn get_file(backend: &'a B, path: &CStr, kind: AclKind) -> io::Result<Self> {
        let raw = backend.get_file(path, kind)?;
        Ok(NativeAcl {
            backend,
            raw,
            qualifiers: PhantomData,
        })
    }

    pub(crate) fn backend(&self) -> &'a B {
        self.backend
    }

    pub(crate) fn raw(&self) -> B::Acl {
        self.raw
    }

    pub(crate) fn create_entry(&mut self) -> Result<B::Entry, AclError> {
        self.backend.create_entry(&mut self.raw)
    }

    /// Iterator of native entry handles. Only one may be active at a time.
    pub(crate) fn raw_iter(&self) -> RawEntries<'_, B> {
        RawEntries::new(self.backend, self.raw)
    }
}

impl<B: AclBackend> Drop for NativeAcl<'_, B> {
    fn drop(&mut self) {
        if let Err(err) = self.backend.free(self.raw) {
            tracing::warn!(error = %err, "failed to release native ACL");
        }
    }
}
