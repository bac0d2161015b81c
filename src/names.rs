//! Rendering UIDs and GIDs as user and group names.
use uzers::{get_group_by_gid, get_user_by_uid, gid_t, uid_t};

/// Maps numeric qualifiers to display names. Returning `None` makes the caller fall back to
/// the number itself.
pub trait NameResolver {
    fn user_name(&self, uid: u32) -> Option<String>;
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Never resolves anything; qualifiers are always rendered as numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericIds;

impl NameResolver for NumericIds {
    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }
    fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }
}

/// Looks names up in the system password and group databases.
///
/// ```
/// use portable_acl::{NameResolver, SystemNames};
/// assert_eq!(SystemNames.user_name(0).as_deref(), Some("root"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNames;

impl NameResolver for SystemNames {
    fn user_name(&self, uid: u32) -> Option<String> {
        get_user_by_uid(uid as uid_t)
            .map(|user| user.name().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        get_group_by_gid(gid as gid_t)
            .map(|group| group.name().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
    }
}
