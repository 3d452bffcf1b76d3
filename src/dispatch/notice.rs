//! One-time outcome notices carried in redirect query strings.

use crate::config::KindConfig;
use crate::core::{BulkAction, Kind};
use serde::Serialize;
use std::collections::HashMap;

/// Query parameter set when a single-term fallback action fails.
pub const NOTICE_PARAM: &str = "notice";
pub const NOTICE_DEFAULT_PROTECTED: &str = "default_protected";
pub const NOTICE_DENIED: &str = "denied";
pub const NOTICE_ERROR: &str = "error";

const BULK_ORDER: [BulkAction; 4] = [
    BulkAction::MoveToDraft,
    BulkAction::MoveToTrash,
    BulkAction::Restore,
    BulkAction::DeletePermanently,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Human-readable summary of a bulk run, e.g. `3 tag(s) moved to trash.`
pub fn bulk_message(kind: Kind, action: BulkAction, count: usize) -> String {
    let label = KindConfig::of(kind).lower_label();
    let verb = match action {
        BulkAction::MoveToDraft => "moved to draft",
        BulkAction::MoveToTrash => "moved to trash",
        BulkAction::Restore => "restored from trash",
        BulkAction::DeletePermanently => "permanently deleted",
    };
    format!("{} {}(s) {}.", count, label, verb)
}

/// Query pairs announcing `count` successes; nothing when zero.
pub fn bulk_params(action: BulkAction, count: usize) -> Vec<(String, String)> {
    if count == 0 {
        return Vec::new();
    }
    vec![(action.notice_param().to_string(), count.to_string())]
}

/// Decodes the notices a list view should display once.
pub fn decode(kind: Kind, params: &HashMap<String, String>) -> Vec<Notice> {
    let label = KindConfig::of(kind).lower_label();
    let mut notices = Vec::new();

    for action in BULK_ORDER {
        let Some(raw) = params.get(action.notice_param()) else {
            continue;
        };
        let count = raw.trim().parse::<usize>().unwrap_or(0);
        notices.push(Notice {
            level: NoticeLevel::Success,
            message: bulk_message(kind, action, count),
        });
    }

    if let Some(code) = params.get(NOTICE_PARAM) {
        let message = match code.as_str() {
            NOTICE_DEFAULT_PROTECTED => {
                format!("Default {} cannot be moved to draft/trash or deleted.", label)
            }
            NOTICE_DENIED => "You do not have permission to perform this action.".to_string(),
            _ => "Action failed. Please try again.".to_string(),
        };
        notices.push(Notice {
            level: NoticeLevel::Error,
            message,
        });
    }

    notices
}
