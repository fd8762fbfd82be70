//! Git commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - Parent commit ID(s) (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Commits fetched from other tools may carry extra headers (`gpgsig`,
//! `encoding`, `mergetag`) between the committer and the blank line. Those are
//! skipped when decoding; the stored bytes are never re-encoded, so nothing is
//! lost.
//! Text that is not UTF-8 (an `encoding` header naming a legacy charset) is
//! decoded lossily for the same reason.

use crate::artifacts::core::{Result, StoreError};
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// `Name <email> <epoch-seconds> <zone-offset>`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load an identity from `GIT_<ROLE>_NAME`, `GIT_<ROLE>_EMAIL` and the
    /// optional `GIT_<ROLE>_DATE`, where role is `AUTHOR` or `COMMITTER`.
    ///
    /// Dates are accepted as RFC 2822, `%Y-%m-%d %H:%M:%S %z`, or git's own
    /// `<epoch> <zone>` form (optionally prefixed with `@`).
    pub fn load_from_env(role: &str) -> Result<Self> {
        let var = |field: &str| std::env::var(format!("GIT_{role}_{field}"));

        let name = var("NAME")
            .map_err(|_| StoreError::InvalidArgument(format!("GIT_{role}_NAME not set")))?;
        let email = var("EMAIL")
            .map_err(|_| StoreError::InvalidArgument(format!("GIT_{role}_EMAIL not set")))?;
        let timestamp = var("DATE").ok().and_then(|date| parse_date(&date));

        match timestamp {
            Some(timestamp) => Ok(Author::new_with_timestamp(name, email, timestamp)),
            None => Ok(Author::new(name, email)),
        }
    }
}

fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(date)
        .or_else(|_| DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
        .or_else(|| {
            let (seconds, zone) = date.trim_start_matches('@').split_once(' ')?;
            to_datetime(seconds.parse().ok()?, zone)
        })
}

/// Build a timestamp from epoch seconds and a `+HHMM`/`-HHMM` zone
fn to_datetime(seconds: i64, zone: &str) -> Option<DateTime<FixedOffset>> {
    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;

    Some(DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset))
}

impl TryFrom<&str> for Author {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self> {
        let invalid = || StoreError::CorruptObject(format!("invalid identity line: {value}"));

        // Format: "name <email> timestamp timezone"
        let mut parts = value.rsplitn(3, ' ');
        let zone = parts.next().ok_or_else(invalid)?;
        let seconds = parts
            .next()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(invalid)?;
        let name_email = parts.next().ok_or_else(invalid)?;

        let email_start = name_email.find('<').ok_or_else(invalid)?;
        let email_end = name_email.rfind('>').ok_or_else(invalid)?;
        if email_end < email_start {
            return Err(invalid());
        }

        Ok(Author {
            name: name_email[..email_start].trim().to_string(),
            email: name_email[email_start + 1..email_end].to_string(),
            timestamp: to_datetime(seconds, zone).ok_or_else(invalid)?,
        })
    }
}

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for a root commit, several for merges)
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        Ok(Bytes::from(lines.join("\n")))
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let corrupt = |reason: &str| StoreError::CorruptObject(format!("invalid commit: {reason}"));
        let parse_oid = |oid: &str| {
            ObjectId::try_parse(oid.to_string()).map_err(|_| corrupt("malformed object id"))
        };

        // legacy encodings decode lossily
        let content = String::from_utf8_lossy(&payload);
        let (header, message) = content
            .split_once("\n\n")
            .ok_or_else(|| corrupt("missing blank line before message"))?;

        let mut lines = header.lines();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .ok_or_else(|| corrupt("missing tree line"))?;
        let tree_oid = parse_oid(tree_oid)?;

        // zero, one, or many parents
        let mut parents = Vec::new();
        let mut next_line = lines.next().ok_or_else(|| corrupt("missing author line"))?;
        while let Some(parent) = next_line.strip_prefix("parent ") {
            parents.push(parse_oid(parent)?);
            next_line = lines.next().ok_or_else(|| corrupt("missing author line"))?;
        }

        let author = next_line
            .strip_prefix("author ")
            .ok_or_else(|| corrupt("missing author line"))?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .ok_or_else(|| corrupt("missing committer line"))?;
        let committer = Author::try_from(committer)?;

        Ok(Self::new(
            parents,
            tree_oid,
            author,
            committer,
            message.to_string(),
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
