use crate::core::Kind;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Static per-kind settings: display label and storage key layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindConfig {
    pub kind: Kind,
    /// Host-platform taxonomy name, e.g. `aps_category`.
    pub taxonomy: &'static str,
    /// Human-readable singular label.
    pub label: &'static str,
    /// Prefix of the current metadata keys.
    pub meta_prefix: &'static str,
    /// Prefix used by installs that predate `meta_prefix`.
    pub legacy_prefix: &'static str,
}

const KIND_TABLE: [KindConfig; 3] = [
    KindConfig {
        kind: Kind::Category,
        taxonomy: "aps_category",
        label: "Category",
        meta_prefix: "_aps_category_",
        legacy_prefix: "aps_category_",
    },
    KindConfig {
        kind: Kind::Tag,
        taxonomy: "aps_tag",
        label: "Tag",
        meta_prefix: "_aps_tag_",
        legacy_prefix: "aps_tag_",
    },
    KindConfig {
        kind: Kind::Ribbon,
        taxonomy: "aps_ribbon",
        label: "Ribbon",
        meta_prefix: "_aps_ribbon_",
        legacy_prefix: "aps_ribbon_",
    },
];

impl KindConfig {
    pub fn of(kind: Kind) -> &'static KindConfig {
        &KIND_TABLE[kind.index()]
    }

    pub fn status_key(&self) -> String {
        format!("{}status", self.meta_prefix)
    }

    pub fn is_default_key(&self) -> String {
        format!("{}is_default", self.meta_prefix)
    }

    pub fn updated_at_key(&self) -> String {
        format!("{}updated_at", self.meta_prefix)
    }

    /// Legacy spelling of a current key (`_aps_tag_status` -> `aps_tag_status`).
    pub fn legacy_key(&self, current: &str) -> Option<String> {
        current
            .strip_prefix(self.meta_prefix)
            .map(|field| format!("{}{}", self.legacy_prefix, field))
    }

    /// Authenticity-token action name, e.g. `aps_aps_tag_row_action`.
    pub fn nonce_action(&self, action: &str) -> String {
        format!("aps_{}_{}", self.taxonomy, action)
    }

    pub fn lower_label(&self) -> String {
        self.label.to_ascii_lowercase()
    }
}

/// Engine and server configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Read pre-migration metadata keys when the current key is empty.
    pub legacy_fallback: bool,

    /// HTTP listen address for the admin adapters
    pub bind: SocketAddr,

    /// Optional JSON snapshot of the reference store
    pub snapshot_path: Option<PathBuf>,
}

impl EngineConfig {
    pub const DEFAULT_BIND: &'static str = "127.0.0.1:8088";

    pub fn new() -> Self {
        Self {
            legacy_fallback: true,
            bind: SocketAddr::from(([127, 0, 0, 1], 8088)),
            snapshot_path: None,
        }
    }

    /// Set legacy key fallback
    pub fn legacy_fallback(mut self, enabled: bool) -> Self {
        self.legacy_fallback = enabled;
        self
    }

    /// Set the listen address
    pub fn bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set the snapshot file
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Reads `TERM_LIFECYCLE_BIND`, `TERM_LIFECYCLE_SNAPSHOT` and
    /// `TERM_LIFECYCLE_LEGACY_FALLBACK` on top of the defaults.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::new();

        if let Ok(raw) = env::var("TERM_LIFECYCLE_BIND") {
            let bind = raw
                .parse::<SocketAddr>()
                .map_err(|e| format!("TERM_LIFECYCLE_BIND must be host:port: {}", e))?;
            config = config.bind(bind);
        }

        if let Ok(raw) = env::var("TERM_LIFECYCLE_SNAPSHOT") {
            if !raw.trim().is_empty() {
                config = config.snapshot_path(raw.trim());
            }
        }

        if let Ok(raw) = env::var("TERM_LIFECYCLE_LEGACY_FALLBACK") {
            config = config.legacy_fallback(parse_flag(&raw)?);
        }

        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean flag, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_table_is_indexed_by_kind() {
        for kind in Kind::ALL {
            assert_eq!(KindConfig::of(kind).kind, kind);
        }
    }

    #[test]
    fn keys_use_the_kind_prefix() {
        let ribbon = KindConfig::of(Kind::Ribbon);
        assert_eq!(ribbon.status_key(), "_aps_ribbon_status");
        assert_eq!(ribbon.is_default_key(), "_aps_ribbon_is_default");
        assert_eq!(
            ribbon.legacy_key(&ribbon.is_default_key()).as_deref(),
            Some("aps_ribbon_is_default")
        );
        assert_eq!(ribbon.legacy_key("unrelated"), None);
    }

    #[test]
    fn nonce_actions_are_scoped_per_taxonomy() {
        let category = KindConfig::of(Kind::Category);
        assert_eq!(category.nonce_action("row_action"), "aps_aps_category_row_action");
        assert_ne!(
            category.nonce_action("row_action"),
            KindConfig::of(Kind::Tag).nonce_action("row_action")
        );
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = EngineConfig::new()
            .legacy_fallback(false)
            .snapshot_path("/tmp/terms.json");
        assert!(!config.legacy_fallback);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/terms.json")));
        assert_eq!(config.bind.to_string(), EngineConfig::DEFAULT_BIND);
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag("YES"), Ok(true));
        assert_eq!(parse_flag("0"), Ok(false));
        assert!(parse_flag("maybe").is_err());
    }
}
