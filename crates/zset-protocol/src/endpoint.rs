use std::fmt;

/// HTTP endpoint paths of the seven store operations.
pub mod endpoints {
    pub const INSERT: &str = "/insert";
    pub const DELETE: &str = "/delete";
    pub const SELECT: &str = "/select";
    pub const KEYS: &str = "/keys";
    pub const SIZE: &str = "/size";
    pub const MEMBERS: &str = "/members";
    pub const SCORE: &str = "/score";
}

/// Diagnostic headers set on every success reply.
pub mod headers {
    pub const DURATION: &str = "x-duration";
    pub const KEY: &str = "x-key";
    pub const FIELD: &str = "x-field";
}

/// Query parameter names.
pub mod params {
    pub const KEY: &str = "key";
    pub const FIELD: &str = "field";
}

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One of the seven store operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Delete,
    Select,
    Keys,
    Size,
    Members,
    Score,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Self::Insert,
        Self::Delete,
        Self::Select,
        Self::Keys,
        Self::Size,
        Self::Members,
        Self::Score,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Insert => endpoints::INSERT,
            Self::Delete => endpoints::DELETE,
            Self::Select => endpoints::SELECT,
            Self::Keys => endpoints::KEYS,
            Self::Size => endpoints::SIZE,
            Self::Members => endpoints::MEMBERS,
            Self::Score => endpoints::SCORE,
        }
    }

    /// Mutations are POSTed with a members body; everything else is a GET.
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Insert | Self::Delete)
    }

    pub fn takes_key(self) -> bool {
        !matches!(self, Self::Keys)
    }

    pub fn takes_field(self) -> bool {
        matches!(self, Self::Select | Self::Score)
    }

    pub fn name(self) -> &'static str {
        &self.path()[1..]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
