use crate::error::FindError;

/// The user and group databases consulted by the ownership predicates and
/// the extended listing.
///
/// Every method distinguishes "not found" (`Ok(None)`) from "the database
/// could not be read" (`Err`). A miss is an ordinary outcome: it is what
/// makes `-nouser` true and what stops `-user` from matching. Errors are
/// reported by the caller and otherwise treated like a miss.
///
/// Implementations are queried on every evaluation; nothing here is
/// expected to cache.
///
/// # Example
///
/// ```rust
/// use pfind::{FindError, IdentityDb};
///
/// struct RootOnly;
///
/// impl IdentityDb for RootOnly {
///     fn user_name(&self, uid: u32) -> Result<Option<String>, FindError> {
///         Ok((uid == 0).then(|| "root".to_string()))
///     }
///     fn user_id(&self, name: &str) -> Result<Option<u32>, FindError> {
///         Ok((name == "root").then_some(0))
///     }
///     fn group_name(&self, gid: u32) -> Result<Option<String>, FindError> {
///         Ok((gid == 0).then(|| "root".to_string()))
///     }
///     fn group_id(&self, name: &str) -> Result<Option<u32>, FindError> {
///         Ok((name == "root").then_some(0))
///     }
/// }
/// ```
pub trait IdentityDb {
    /// Name of the user with this uid.
    fn user_name(&self, uid: u32) -> Result<Option<String>, FindError>;

    /// Uid of the user with this name.
    fn user_id(&self, name: &str) -> Result<Option<u32>, FindError>;

    /// Name of the group with this gid.
    fn group_name(&self, gid: u32) -> Result<Option<String>, FindError>;

    /// Gid of the group with this name.
    fn group_id(&self, name: &str) -> Result<Option<u32>, FindError>;
}
