use crate::error::AclError::{AllocationError, NativeError, NoAcl, ValidationError, WriteError};
use crate::file::AclKind;
use simple_error::SimpleError;
use std::error::Error;
use std::io::ErrorKind;
use std::{fmt, io};

/// Error type from ACL operations.
#[derive(Debug)]
pub enum AclError {
    /// Backing storage could not be reserved. The value names what was being allocated.
    AllocationError(&'static str),
    /// A libacl primitive reported failure.
    NativeError { func: &'static str, err: io::Error },
    /// No ACL of the requested kind could be obtained for the path.
    NoAcl { kind: AclKind, err: io::Error },
    /// The platform refused to install the ACL on the path.
    WriteError { kind: AclKind, err: io::Error },
    /// ACL is not valid, the message says why.
    ValidationError(SimpleError),
}

impl Error for AclError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AllocationError(_) => None,
            NativeError { err, .. } | NoAcl { err, .. } | WriteError { err, .. } => Some(err),
            ValidationError(err) => Some(err),
        }
    }
}

impl fmt::Display for AclError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllocationError(what) => write!(f, "Unable to allocate {}", what),
            NativeError { func, err } => write!(f, "Error in {}: {}", func, err),
            NoAcl { kind, err } => write!(f, "Error reading {}: {}", kind, err),
            WriteError { kind, err } => write!(f, "Error writing {}: {}", kind, err),
            ValidationError(err) => write!(f, "ACL failed validation: {}", err),
        }
    }
}

impl AclError {
    /// Get a general category of error. `ValidationError` gets returned as `InvalidData`.
    ///
    /// ```
    /// use portable_acl::Acl;
    /// use std::io::ErrorKind;
    /// let err = Acl::read_acl("/tmp/this-file-does-not-exist").unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::NotFound);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            AllocationError(_) => ErrorKind::OutOfMemory,
            ValidationError(_) => ErrorKind::InvalidData,
            NativeError { err, .. } | NoAcl { err, .. } | WriteError { err, .. } => err.kind(),
        }
    }

    /// Build a `NativeError` from `errno` as left behind by `func`.
    pub(crate) fn last_native_error(func: &'static str) -> AclError {
        NativeError {
            func,
            err: io::Error::last_os_error(),
        }
    }

    pub(crate) fn native(func: &'static str, kind: ErrorKind, msg: &str) -> AclError {
        NativeError {
            func,
            err: io::Error::new(kind, msg),
        }
    }
}
