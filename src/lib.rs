//! portable-acl is a library for reading and writing POSIX filesystem ACLs as plain Rust values.
//! It uses the operating system's C API (libacl) internally.
//!
//! An [`Acl`] is an ordered, fixed-length sequence of [`Entry`] values. Reading a path's ACL
//! converts the native ACL object into an `Acl`; writing converts it back, preserving entry
//! order exactly. All native resources are released on every path, including failures.
//!
//! ```
//! use portable_acl::{Acl, Entry, Tag};
//! let mut acl = Acl::create(3).unwrap();
//! acl.put_entry(0, Entry::new(Tag::UserObj, 0, 6));
//! acl.put_entry(1, Entry::new(Tag::GroupObj, 0, 6));
//! acl.put_entry(2, Entry::new(Tag::Other, 0, 4));
//! assert_eq!(acl, Acl::from_mode(0o664));
//! ```

mod acl;
mod arena;
mod convert;
mod entry;
mod error;
pub mod file;
mod iter;
mod names;
mod native;
mod util;

pub use crate::acl::Acl;
pub use crate::entry::{Entry, Tag};
pub use crate::error::AclError;
pub use crate::file::AclKind;
pub use crate::names::{NameResolver, NumericIds, SystemNames};
pub use crate::native::{AclBackend, Libacl};

/// Read permission
pub const ACL_READ: u32 = acl_sys::ACL_READ;
/// Write permission
pub const ACL_WRITE: u32 = acl_sys::ACL_WRITE;
/// Execute permission
pub const ACL_EXECUTE: u32 = acl_sys::ACL_EXECUTE;
/// All possible permissions
pub const ACL_RWX: u32 = ACL_READ | ACL_WRITE | ACL_EXECUTE;

#[cfg(test)]
mod mock;
