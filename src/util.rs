//! This file is for small helpers & utilities that aren't exported by the library.
use crate::error::AclError;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// NB! Unix-only
pub(crate) fn path_to_cstring(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

/// libacl convention: negative return means failure, `errno` has the details.
pub(crate) fn check_return(ret: i32, func: &'static str) -> Result<i32, AclError> {
    if ret < 0 {
        Err(AclError::last_native_error(func))
    } else {
        Ok(ret)
    }
}

pub(crate) fn check_pointer<T: ?Sized>(ret: *const T, func: &'static str) -> Result<(), AclError> {
    if ret.is_null() {
        Err(AclError::last_native_error(func))
    } else {
        Ok(())
    }
}
