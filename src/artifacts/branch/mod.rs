pub mod branch_name;

/// Names git refuses as branch names: leading dots or slashes, `..`, `/.`,
/// a `.lock` suffix, `@{`, control characters, and the revision syntax characters
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

pub const HEADS_PREFIX: &str = "refs/heads/";

/// Branch a freshly initialised repository points HEAD at
pub const DEFAULT_BRANCH: &str = "main";
