use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{colorize, replace_args};

/// Localized message strings keyed by dotted names (`command.socket-success`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language {
    strings: BTreeMap<String, String>,
}

impl Language {
    pub fn new(strings: BTreeMap<String, String>) -> Self {
        Self { strings }
    }

    /// English strings shipped with the forge; loaded files override per key.
    pub fn builtin() -> Self {
        let pairs = [
            ("command.socket-instructions", "&7Right-click the item you wish to socket with the gem in your main hand."),
            ("command.socket-cannot-use", "&cYou cannot use that socket gem on that item."),
            ("command.socket-do-not-have", "&cYou no longer have that socket gem."),
            ("command.socket-success", "&aYou successfully socketed your item!"),
            ("command.identifying-instructions", "&7Right-click the unidentified item you wish to identify."),
            ("command.identifying-cannot-use", "&cYou cannot identify that item."),
            ("command.identifying-do-not-have", "&cYou no longer have that identity tome."),
            ("command.identifying-success", "&aYou successfully identified your item!"),
            ("command.found-item-broadcast", "&a%receiver% found %item%&a!"),
        ];
        Self {
            strings: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Overlay `other` on top of `self`.
    pub fn merged(mut self, other: Language) -> Self {
        self.strings.extend(other.strings);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// Look up, substitute and colorize. Unknown keys format to "".
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        match self.strings.get(key) {
            Some(raw) => colorize(&replace_args(raw, args)),
            None => {
                tracing::debug!(key, "missing language string");
                String::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
