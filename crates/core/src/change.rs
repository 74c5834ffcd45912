//! Change kinds and the per-entry flag set they accumulate into

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A distinguishable kind of change the event facility can report
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ChangeKind {
    /// The file was unlinked
    Delete,
    /// File contents were written
    Write,
    /// The file grew
    Extend,
    /// Attributes (mode, owner, times) changed
    Attrib,
    /// Link count changed
    Link,
    /// The file was renamed
    Rename,
    /// Access was revoked or the filesystem went away
    Revoke,
}

impl ChangeKind {
    /// Every kind, in declaration order
    pub const ALL: [ChangeKind; 7] = [
        ChangeKind::Delete,
        ChangeKind::Write,
        ChangeKind::Extend,
        ChangeKind::Attrib,
        ChangeKind::Link,
        ChangeKind::Rename,
        ChangeKind::Revoke,
    ];

    /// Whether this kind means the handle no longer names the file at its path
    pub const fn invalidates_handle(self) -> bool {
        match self {
            ChangeKind::Delete | ChangeKind::Rename | ChangeKind::Revoke => true,
            ChangeKind::Write | ChangeKind::Extend | ChangeKind::Attrib | ChangeKind::Link => false,
        }
    }

    /// Short lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            ChangeKind::Delete => "delete",
            ChangeKind::Write => "write",
            ChangeKind::Extend => "extend",
            ChangeKind::Attrib => "attrib",
            ChangeKind::Link => "link",
            ChangeKind::Rename => "rename",
            ChangeKind::Revoke => "revoke",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of change kinds accumulated since the last flush
#[derive(Copy, Clone, Default, Hash, Eq, PartialEq)]
pub struct ChangeSet(u8);

impl ChangeSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set holding a single kind
    pub const fn of(kind: ChangeKind) -> Self {
        Self(kind.bit())
    }

    /// Set holding every kind
    pub fn all() -> Self {
        ChangeKind::ALL.iter().copied().collect()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, kind: ChangeKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True if any member is in `other`
    pub const fn intersects(&self, other: ChangeSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, kind: ChangeKind) {
        self.0 |= kind.bit();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Return the current set and leave this one empty
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(self)
    }

    /// Number of kinds in the set
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether any member invalidates the watch handle
    pub fn invalidates_handle(&self) -> bool {
        self.iter().any(ChangeKind::invalidates_handle)
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = ChangeKind> + '_ {
        ChangeKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }
}

impl From<ChangeKind> for ChangeSet {
    fn from(kind: ChangeKind) -> Self {
        Self::of(kind)
    }
}

impl FromIterator<ChangeKind> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeKind>>(iter: I) -> Self {
        let mut set = ChangeSet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl BitOr for ChangeSet {
    type Output = ChangeSet;

    fn bitor(self, rhs: ChangeSet) -> ChangeSet {
        ChangeSet(self.0 | rhs.0)
    }
}

impl BitOr<ChangeKind> for ChangeSet {
    type Output = ChangeSet;

    fn bitor(self, rhs: ChangeKind) -> ChangeSet {
        ChangeSet(self.0 | rhs.bit())
    }
}

impl BitOr for ChangeKind {
    type Output = ChangeSet;

    fn bitor(self, rhs: ChangeKind) -> ChangeSet {
        ChangeSet(self.bit() | rhs.bit())
    }
}

impl BitOrAssign for ChangeSet {
    fn bitor_assign(&mut self, rhs: ChangeSet) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<ChangeKind> for ChangeSet {
    fn bitor_assign(&mut self, rhs: ChangeKind) {
        self.insert(rhs);
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(kind.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeSet({})", self)
    }
}
