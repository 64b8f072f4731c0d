//! Sort keys derived from compiler file names.

use regex_lite::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::version::Version;

/// A dotted run at the start of the text or after a separator or `v`.
fn dotted_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9A-Za-z.]|v)(\d+(?:\.\d+)+)").expect("static version pattern")
    })
}

/// A lone integer that opens the text, e.g. `8` or `v8-linux`.
fn leading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v?(\d+)(?:$|[^0-9A-Za-z.])").expect("static version pattern"))
}

/// Extract a version from a compiler file name suffix.
///
/// The first dotted numeric run wins, so `linux-amd64-v0.8.20+commit.a1b79de6`
/// yields `0.8.20` rather than the `64` in `amd64`. A bare integer counts
/// only when it opens the text; `nightly-2024` and `latest` yield `None`.
pub fn extract_version(text: &str) -> Option<Version> {
    let caps = dotted_pattern()
        .captures(text)
        .or_else(|| leading_pattern().captures(text))?;
    Version::parse(caps.get(1)?.as_str()).ok()
}

/// Ordering key for one compiler binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionKey {
    /// File name the key was derived from
    pub name: String,

    /// Derived version, `None` when the name carries no usable version
    pub version: Option<Version>,
}

impl VersionKey {
    /// Derive the key for `file_name`.
    ///
    /// A file named exactly `default_name` takes `default_version`. Any other
    /// name has the `<default_name>-` prefix stripped and the first dotted
    /// numeric run of the remainder used as its version.
    /// See [`extract_version`].
    pub fn for_binary(file_name: &str, default_name: &str, default_version: &Version) -> Self {
        let version = if file_name == default_name {
            Some(default_version.clone())
        } else {
            let suffix = file_name
                .strip_prefix(default_name)
                .and_then(|rest| rest.strip_prefix('-'))
                .unwrap_or(file_name);
            extract_version(suffix)
        };

        Self {
            name: file_name.to_string(),
            version,
        }
    }

    /// Preference order: highest version first, unversioned names last,
    /// ties broken by name ascending.
    pub fn preference(&self, other: &Self) -> Ordering {
        match (&self.version, &other.version) {
            (Some(a), Some(b)) => b.cmp(a).then_with(|| self.name.cmp(&other.name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.name.cmp(&other.name),
        }
    }
}

/// Sort `items` so the most preferred compiler comes first.
pub fn order_by_preference<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &VersionKey,
{
    items.sort_by(|a, b| key(a).preference(key(b)));
}
