//! Reading and writing the ACLs of filesystem paths.
use crate::arena::QualifierArena;
use crate::convert::{decode, encode};
use crate::error::AclError;
use crate::native::{AclBackend, Libacl, NativeAcl};
use crate::util::path_to_cstring;
use crate::Acl;
use std::fmt;
use std::path::Path;

/// Which of a path's ACLs to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclKind {
    /// The ACL governing access to the path itself.
    Access,
    /// The ACL inherited by new entries of a directory. Only directories have one.
    Default,
}

impl fmt::Display for AclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AclKind::Access => "ACL",
            AclKind::Default => "default ACL",
        })
    }
}

/// Read the `kind` ACL of `path` using the system's libacl.
///
/// # Errors
/// See [`Acl::read_acl()`].
pub fn get(path: &Path, kind: AclKind) -> Result<Acl, AclError> {
    get_with(&Libacl, path, kind)
}

/// Replace the `kind` ACL of `path` using the system's libacl.
///
/// # Errors
/// See [`Acl::write_acl()`].
pub fn set(path: &Path, kind: AclKind, acl: &Acl) -> Result<(), AclError> {
    set_with(&Libacl, path, kind, acl)
}

/// Like [`get()`], with an explicit native backend.
///
/// # Errors
/// See [`Acl::read_acl()`].
pub fn get_with<B: AclBackend>(backend: &B, path: &Path, kind: AclKind) -> Result<Acl, AclError> {
    let c_path = path_to_cstring(path).map_err(|err| AclError::NativeError {
        func: "acl_get_file",
        err,
    })?;
    let native = NativeAcl::get_file(backend, &c_path, kind)
        .map_err(|err| AclError::NoAcl { kind, err })?;
    let acl = decode(&native)?;
    drop(native);

    tracing::debug!(path = %path.display(), kind = %kind, entries = acl.len(), "read ACL");
    Ok(acl)
}

/// Like [`set()`], with an explicit native backend.
///
/// The native ACL and every qualifier allocated for it are released before returning, whether
/// or not the platform accepted the ACL.
///
/// # Errors
/// See [`Acl::write_acl()`].
pub fn set_with<B: AclBackend>(
    backend: &B,
    path: &Path,
    kind: AclKind,
    acl: &Acl,
) -> Result<(), AclError> {
    let c_path = path_to_cstring(path).map_err(|err| AclError::WriteError { kind, err })?;
    let mut arena = QualifierArena::with_slots(acl.len())?;
    let native = encode(backend, acl, &mut arena)?;
    let result = backend.set_file(&c_path, kind, native.raw());
    drop(native);
    arena.clear();

    match result {
        Ok(()) => {
            tracing::debug!(path = %path.display(), kind = %kind, entries = acl.len(), "wrote ACL");
            Ok(())
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), kind = %kind, error = %err, "writing ACL failed");
            Err(AclError::WriteError { kind, err })
        }
    }
}
