use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PathContextError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(GroupId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    Copy,
    Move,
}

impl TransferMode {
    /// Mode a relocation starts in: groups scoped under a parent are moved,
    /// root-level groups are copied.
    pub fn initial_for(path: &PathContext) -> Self {
        if path.is_root_level() {
            TransferMode::Copy
        } else {
            TransferMode::Move
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Copy => f.write_str("copy"),
            TransferMode::Move => f.write_str("move"),
        }
    }
}

/// Ancestor chain of the relocated group, tree root first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathContext(Vec<GroupId>);

impl PathContext {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(ancestors: Vec<GroupId>) -> Self {
        Self(ancestors)
    }

    pub fn is_root_level(&self) -> bool {
        self.0.is_empty()
    }

    pub fn immediate_parent(&self) -> Option<GroupId> {
        self.0.last().copied()
    }

    pub fn ancestors(&self) -> &[GroupId] {
        &self.0
    }
}

impl FromStr for PathContext {
    type Err = PathContextError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::root());
        }

        raw.split(',')
            .map(|segment| {
                let segment = segment.trim();
                segment
                    .parse::<i64>()
                    .map(GroupId)
                    .map_err(|_| PathContextError::InvalidSegment(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
