use crate::error::AclError;
use crate::file::{self, AclKind};
use crate::names::{NameResolver, NumericIds};
use crate::Tag::*;
use crate::{Entry, Tag, ACL_RWX};
use simple_error::SimpleError;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::slice;

/// A portable POSIX ACL: a fixed-length, ordered sequence of [`Entry`] values.
///
/// Order is the order of the native ACL the value was decoded from (or will be encoded to) and
/// is preserved across conversion. The length is set at construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acl {
    entries: Box<[Entry]>,
}

impl Acl {
    /// Create an ACL with `count` entries, all with tag [`Tag::Unset`], ready to be filled in
    /// with [`Acl::put_entry()`].
    ///
    /// # Errors
    /// * `AclError::AllocationError`: storage for the entries could not be reserved.
    pub fn create(count: usize) -> Result<Acl, AclError> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count)
            .map_err(|_| AclError::AllocationError("ACL entries"))?;
        entries.resize(count, Entry::default());
        Ok(Acl {
            entries: entries.into_boxed_slice(),
        })
    }

    /// Build an ACL holding exactly `entries`, in order.
    pub fn from_entries<I: IntoIterator<Item = Entry>>(entries: I) -> Acl {
        Acl {
            entries: entries.into_iter().collect(),
        }
    }

    /// Convert a file mode ("chmod" number) into a minimal ACL of `UserObj`, `GroupObj` and
    /// `Other` entries. Note that modes are usually expressed in octal.
    ///
    /// Input bits higher than 9 (e.g. SUID flag, etc) are ignored.
    ///
    /// ```
    /// use portable_acl::Acl;
    /// assert_eq!(Acl::from_mode(0o751).to_string(), "u::rwx,g::r-x,o::--x");
    /// ```
    #[must_use]
    pub fn from_mode(mode: u32) -> Acl {
        Acl::from_entries(vec![
            Entry::new(UserObj, 0, (mode >> 6) & ACL_RWX),
            Entry::new(GroupObj, 0, (mode >> 3) & ACL_RWX),
            Entry::new(Other, 0, mode & ACL_RWX),
        ])
    }

    /// The nine permission bits described by the `UserObj`, `GroupObj` and `Other` entries,
    /// wherever they are in the sequence. Missing entries contribute no bits.
    #[must_use]
    pub fn mode(&self) -> u32 {
        self.entries.iter().fold(0, |mode, entry| {
            let perms = entry.perms & ACL_RWX;
            match entry.tag {
                UserObj => mode | perms << 6,
                GroupObj => mode | perms << 3,
                Other => mode | perms,
                _ => mode,
            }
        })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// # Panics
    ///
    /// When `index >= self.len()`.
    #[must_use]
    pub fn get_entry(&self, index: usize) -> Entry {
        self.entries[index]
    }

    /// Overwrite the entry at `index`.
    ///
    /// # Panics
    ///
    /// When `index >= self.len()`.
    pub fn put_entry(&mut self, index: usize, entry: Entry) {
        self.entries[index] = entry;
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Read a path's access ACL.
    /// ```
    /// use portable_acl::Acl;
    /// let acl = Acl::read_acl("/etc/shells").unwrap();
    /// ```
    ///
    /// # Errors
    /// * `AclError::NoAcl`: the platform returned no ACL (file not found, permission denied,
    ///   filesystem without ACL support, etc).
    /// * `AclError::NativeError`: decoding the returned ACL failed, or the path contains a
    ///   NUL byte and could not be passed to the platform at all.
    ///
    /// <div class="warning">
    /// It is NOT an error if the provided path has no extended ACL; the minimal ACL
    /// equivalent to the file mode is returned.
    /// </div>
    pub fn read_acl<P: AsRef<Path>>(path: P) -> Result<Acl, AclError> {
        file::get(path.as_ref(), AclKind::Access)
    }

    /// Read a directory's default ACL. Fails if `path` is not a directory.
    ///
    /// Default ACL determines permissions for new files and subdirectories created in the
    /// directory.
    /// ```
    /// use portable_acl::Acl;
    /// let acl = Acl::read_default_acl("/tmp").unwrap();
    /// ```
    ///
    /// # Errors
    /// * `AclError::NoAcl`: the platform returned no ACL. Passing a non-directory path fails
    ///   with 'permission denied' on Linux.
    /// * `AclError::NativeError`: decoding the returned ACL failed.
    ///
    /// <div class="warning">
    /// It is NOT an error if the directory has no default ACL; an empty ACL is returned.
    /// </div>
    pub fn read_default_acl<P: AsRef<Path>>(path: P) -> Result<Acl, AclError> {
        file::get(path.as_ref(), AclKind::Default)
    }

    /// Write this ACL as the path's access ACL, replacing the existing one.
    ///
    /// The ACL is written as is: the `Mask` entry is not recalculated and no validation
    /// happens beyond what the platform does. See [`Acl::validate()`].
    ///
    /// # Errors
    /// * `AclError::WriteError`: the platform refused the ACL (file not found, invalid ACL, etc).
    /// * `AclError::NativeError`, `AclError::AllocationError`: building the native ACL failed.
    pub fn write_acl<P: AsRef<Path>>(&self, path: P) -> Result<(), AclError> {
        file::set(path.as_ref(), AclKind::Access, self)
    }

    /// Write this ACL as a directory's default ACL, replacing the existing one. Fails if `path`
    /// is not a directory.
    ///
    /// # Errors
    /// Same as [`Acl::write_acl()`].
    pub fn write_default_acl<P: AsRef<Path>>(&self, path: P) -> Result<(), AclError> {
        file::set(path.as_ref(), AclKind::Default, self)
    }

    /// Check the ACL against the POSIX.1e rules.
    ///
    /// # Errors
    /// * `AclError::ValidationError` naming the first problem found:
    ///   * `UserObj`, `GroupObj` and `Other` must appear exactly once.
    ///   * `Mask` may appear at most once, and is required with any `User` or `Group` entry.
    ///   * `User` and `Group` qualifiers must be unique.
    ///   * No entry may be `Unset` or have permission bits other than `ACL_RWX`.
    pub fn validate(&self) -> Result<(), AclError> {
        self.check().map_err(AclError::ValidationError)
    }

    fn check(&self) -> Result<(), SimpleError> {
        let mut users = HashSet::new();
        let mut groups = HashSet::new();
        let count = |tag: Tag| self.entries.iter().filter(|e| e.tag == tag).count();

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.perms & !ACL_RWX != 0 {
                return Err(SimpleError::new(format!(
                    "entry {} has invalid permission bits {:#o}",
                    index, entry.perms
                )));
            }
            match entry.tag {
                Unset => {
                    return Err(SimpleError::new(format!("entry {} has no tag", index)));
                }
                User if !users.insert(entry.qualifier) => {
                    return Err(SimpleError::new(format!(
                        "duplicate user entry {}",
                        entry.qualifier
                    )));
                }
                Group if !groups.insert(entry.qualifier) => {
                    return Err(SimpleError::new(format!(
                        "duplicate group entry {}",
                        entry.qualifier
                    )));
                }
                _ => {}
            }
        }
        for &tag in &[UserObj, GroupObj, Other] {
            if count(tag) != 1 {
                return Err(SimpleError::new(format!(
                    "expected exactly one {}:: entry, found {}",
                    tag.long_name(),
                    count(tag)
                )));
            }
        }
        match count(Mask) {
            0 if !users.is_empty() || !groups.is_empty() => Err(SimpleError::new(
                "mask entry required with named user or group entries",
            )),
            0 | 1 => Ok(()),
            n => Err(SimpleError::new(format!("{} mask entries", n))),
        }
    }

    /// Short text form, entries separated by commas. For example `u::rwx,g::r-x,o::---,
    /// u:alice:r--,m::r--`: owner has all permissions, owning group read and execute,
    /// others nothing, user alice read, mask read.
    pub fn to_text<R: NameResolver + ?Sized>(&self, names: &R) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_text(names))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Long text form, one entry per line. Entries whose permissions are reduced by the mask
    /// get an `#effective:` annotation:
    /// ```text
    /// user::rwx
    /// group::rw-          #effective:r--
    /// other::---
    /// mask::r--
    /// ```
    pub fn to_long_text<R: NameResolver + ?Sized>(&self, names: &R) -> String {
        let mask = self
            .entries
            .iter()
            .find(|entry| entry.tag == Mask)
            .map_or(ACL_RWX, |entry| entry.perms & ACL_RWX);

        self.entries
            .iter()
            .map(|entry| {
                let perms = entry.perms & ACL_RWX;
                let masked = matches!(entry.tag, User | GroupObj | Group);
                if masked && perms & mask != perms {
                    format!(
                        "{:<20}#effective:{}",
                        entry.to_long_text(names),
                        crate::entry::perm_string(perms & mask)
                    )
                } else {
                    entry.to_long_text(names)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(&NumericIds))
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
