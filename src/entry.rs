use crate::names::{NameResolver, NumericIds};
use crate::Tag::*;
use crate::ACL_RWX;
use acl_sys::{
    ACL_GROUP, ACL_GROUP_OBJ, ACL_MASK, ACL_OTHER, ACL_UNDEFINED_TAG, ACL_USER, ACL_USER_OBJ,
};
use std::fmt;

/// The kind of principal an entry grants permissions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Zero value of a freshly created entry, never produced by decoding
    Unset,
    /// Permissions for owner of the file
    UserObj,
    /// Permissions for user with UID `qualifier`
    User,
    /// Permissions for owning group of the file
    GroupObj,
    /// Permissions for group with GID `qualifier`
    Group,
    /// Upper bound on `User`, `GroupObj` and `Group` permissions
    Mask,
    /// Permissions for everyone else not covered by the ACL
    Other,
}

impl Default for Tag {
    fn default() -> Self {
        Unset
    }
}

impl Tag {
    pub(crate) fn tag_type(self) -> i32 {
        match self {
            Unset => ACL_UNDEFINED_TAG,
            UserObj => ACL_USER_OBJ,
            User => ACL_USER,
            GroupObj => ACL_GROUP_OBJ,
            Group => ACL_GROUP,
            Mask => ACL_MASK,
            Other => ACL_OTHER,
        }
    }

    /// Inverse of `tag_type()`. `ACL_UNDEFINED_TAG` and unknown values map to `None`.
    pub(crate) fn from_tag_type(tag_type: i32) -> Option<Tag> {
        match tag_type {
            ACL_USER_OBJ => Some(UserObj),
            ACL_USER => Some(User),
            ACL_GROUP_OBJ => Some(GroupObj),
            ACL_GROUP => Some(Group),
            ACL_MASK => Some(Mask),
            ACL_OTHER => Some(Other),
            _ => None,
        }
    }

    /// Whether entries with this tag carry a UID/GID.
    pub fn has_qualifier(self) -> bool {
        matches!(self, User | Group)
    }

    /// Single letter used by the short text form.
    pub fn short_name(self) -> &'static str {
        match self {
            UserObj | User => "u",
            GroupObj | Group => "g",
            Mask => "m",
            Other => "o",
            Unset => "?",
        }
    }

    /// Word used by the long text form.
    pub fn long_name(self) -> &'static str {
        match self {
            UserObj | User => "user",
            GroupObj | Group => "group",
            Mask => "mask",
            Other => "other",
            Unset => "????",
        }
    }
}

/// One permission grant of an [`Acl`](crate::Acl).
///
/// `qualifier` is only meaningful for [`Tag::User`] and [`Tag::Group`]; decoding always yields
/// `0` for the other tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Entry {
    pub tag: Tag,
    pub qualifier: u32,
    pub perms: u32,
}

impl Entry {
    #[must_use]
    pub fn new(tag: Tag, qualifier: u32, perms: u32) -> Entry {
        Entry {
            tag,
            qualifier,
            perms,
        }
    }

    /// Short text form, e.g. `u:1000:r-x`.
    pub fn to_text<R: NameResolver + ?Sized>(&self, names: &R) -> String {
        format!(
            "{}:{}:{}",
            self.tag.short_name(),
            self.qualifier_text(names),
            perm_string(self.perms)
        )
    }

    /// Long text form, e.g. `user:alice:r-x`.
    pub fn to_long_text<R: NameResolver + ?Sized>(&self, names: &R) -> String {
        format!(
            "{}:{}:{}",
            self.tag.long_name(),
            self.qualifier_text(names),
            perm_string(self.perms)
        )
    }

    fn qualifier_text<R: NameResolver + ?Sized>(&self, names: &R) -> String {
        match self.tag {
            User => names
                .user_name(self.qualifier)
                .unwrap_or_else(|| self.qualifier.to_string()),
            Group => names
                .group_name(self.qualifier)
                .unwrap_or_else(|| self.qualifier.to_string()),
            _ => String::new(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(&NumericIds))
    }
}

/// `rwx`-style rendering of the lowest three permission bits.
pub(crate) fn perm_string(perms: u32) -> &'static str {
    const PERM_STRINGS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];
    PERM_STRINGS[(perms & ACL_RWX) as usize]
}
