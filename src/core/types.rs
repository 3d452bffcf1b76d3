use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification kind a term belongs to.
///
/// The engine is parametrized by this value; kind-specific labels and storage
/// prefixes live in [`crate::config::KindConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Category,
    Tag,
    Ribbon,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Category, Kind::Tag, Kind::Ribbon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Category => "category",
            Kind::Tag => "tag",
            Kind::Ribbon => "ribbon",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Kind::Category => 0,
            Kind::Tag => 1,
            Kind::Ribbon => 2,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Accepts both the short name (`category`) and the taxonomy name (`aps_category`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let short = trimmed.strip_prefix("aps_").unwrap_or(&trimmed);
        match short {
            "category" => Ok(Kind::Category),
            "tag" => Ok(Kind::Tag),
            "ribbon" => Ok(Kind::Ribbon),
            other => Err(format!("unknown term kind '{}'", other)),
        }
    }
}

/// Opaque term identifier, stable for the lifetime of the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Visibility status of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Published,
    Draft,
    Trashed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Published, Status::Draft, Status::Trashed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Published => "published",
            Status::Draft => "draft",
            Status::Trashed => "trashed",
        }
    }

    /// Strict parse of a persisted value. Callers decide how to treat `None`.
    pub fn parse(raw: &str) -> Option<Status> {
        match raw {
            "published" => Some(Status::Published),
            "draft" => Some(Status::Draft),
            "trashed" => Some(Status::Trashed),
            _ => None,
        }
    }

    /// Normalizes any persisted value: absent, empty or unknown means published.
    pub fn normalize(raw: Option<&str>) -> Status {
        raw.and_then(Status::parse).unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse(s.trim()).ok_or_else(|| format!("unknown status '{}'", s))
    }
}

/// Status filter behind the list-view tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Everything except trashed terms.
    #[default]
    All,
    Published,
    Draft,
    Trashed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Published,
        StatusFilter::Draft,
        StatusFilter::Trashed,
    ];

    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => status != Status::Trashed,
            StatusFilter::Published => status == Status::Published,
            StatusFilter::Draft => status == Status::Draft,
            StatusFilter::Trashed => status == Status::Trashed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Published => "published",
            StatusFilter::Draft => "draft",
            StatusFilter::Trashed => "trashed",
        }
    }

    /// Parses the `status` query parameter; absent or unrecognized means `all`.
    pub fn from_query(raw: Option<&str>) -> StatusFilter {
        match raw.map(str::trim) {
            Some("published") => StatusFilter::Published,
            Some("draft") => StatusFilter::Draft,
            Some("trashed") | Some("trash") => StatusFilter::Trashed,
            _ => StatusFilter::All,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lifecycle command, constructed once at the command boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveToDraft,
    MoveToTrash,
    Restore,
    DeletePermanently,
    /// Inline published/draft toggle.
    SetStatus(Status),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::MoveToDraft => "move_to_draft",
            Command::MoveToTrash => "move_to_trash",
            Command::Restore => "restore",
            Command::DeletePermanently => "delete_permanently",
            Command::SetStatus(_) => "set_status",
        }
    }

    /// Commands that a default term may never perform.
    pub fn is_protected(&self) -> bool {
        match self {
            Command::MoveToDraft | Command::MoveToTrash | Command::DeletePermanently => true,
            Command::Restore => false,
            Command::SetStatus(_) => true,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetStatus(status) => write!(f, "set_status({})", status),
            other => f.write_str(other.name()),
        }
    }
}

/// Per-row command from a list-view control (`do` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Draft,
    Trash,
    Restore,
    DeletePermanently,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::Draft => "draft",
            RowAction::Trash => "trash",
            RowAction::Restore => "restore",
            RowAction::DeletePermanently => "delete_permanently",
        }
    }

    pub fn command(&self) -> Command {
        match self {
            RowAction::Draft => Command::MoveToDraft,
            RowAction::Trash => Command::MoveToTrash,
            RowAction::Restore => Command::Restore,
            RowAction::DeletePermanently => Command::DeletePermanently,
        }
    }

    /// Same outcome bucket as the bulk variant, used by the redirect adapter.
    pub fn as_bulk(&self) -> BulkAction {
        match self {
            RowAction::Draft => BulkAction::MoveToDraft,
            RowAction::Trash => BulkAction::MoveToTrash,
            RowAction::Restore => BulkAction::Restore,
            RowAction::DeletePermanently => BulkAction::DeletePermanently,
        }
    }
}

impl FromStr for RowAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(RowAction::Draft),
            "trash" => Ok(RowAction::Trash),
            "restore" => Ok(RowAction::Restore),
            "delete_permanently" => Ok(RowAction::DeletePermanently),
            other => Err(format!("unknown row action '{}'", other)),
        }
    }
}

/// Bulk command applied to a selection of terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    MoveToDraft,
    MoveToTrash,
    Restore,
    DeletePermanently,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::MoveToDraft => "move_to_draft",
            BulkAction::MoveToTrash => "move_to_trash",
            BulkAction::Restore => "restore",
            BulkAction::DeletePermanently => "delete_permanently",
        }
    }

    pub fn command(&self) -> Command {
        match self {
            BulkAction::MoveToDraft => Command::MoveToDraft,
            BulkAction::MoveToTrash => Command::MoveToTrash,
            BulkAction::Restore => Command::Restore,
            BulkAction::DeletePermanently => Command::DeletePermanently,
        }
    }

    /// Query parameter carrying the one-time success count after a redirect.
    pub fn notice_param(&self) -> &'static str {
        match self {
            BulkAction::MoveToDraft => "moved_to_draft",
            BulkAction::MoveToTrash => "moved_to_trash",
            BulkAction::Restore => "restored_from_trash",
            BulkAction::DeletePermanently => "permanently_deleted",
        }
    }

    /// Bulk actions offered by a list view. The trash view only restores or purges.
    pub fn available_for(view: StatusFilter) -> &'static [BulkAction] {
        match view {
            StatusFilter::Trashed => &[BulkAction::Restore, BulkAction::DeletePermanently],
            _ => &[BulkAction::MoveToDraft, BulkAction::MoveToTrash],
        }
    }
}

impl FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "move_to_draft" => Ok(BulkAction::MoveToDraft),
            "move_to_trash" => Ok(BulkAction::MoveToTrash),
            "restore" => Ok(BulkAction::Restore),
            "delete_permanently" => Ok(BulkAction::DeletePermanently),
            other => Err(format!("unknown bulk action '{}'", other)),
        }
    }
}
