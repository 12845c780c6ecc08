use super::table::RouteTable;

pub const LOCALE_EN: &str = "/en";
pub const LOCALE_VI: &str = "/vi";

pub const NEWS_LEGACY_VI: &str = "/vi/news";
pub const NEWS_VI: &str = "/vi/tin-tuc";
pub const NEWS: &str = "/tin-tuc";

const ADMIN_SEGMENT: &str = "admin";
const LEGACY_ADMIN_PREFIXES: [&str; 2] = ["/en/admin", "/vi/admin"];

/// The category a request path falls into, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Build assets, API routes, uploads, images, favicon.
    Ignored,
    /// `/en/admin...`, `/vi/admin...`
    LegacyLocaleAdmin,
    /// `/vi/news...`
    LegacyNewsAlias,
    /// `/vi/tin-tuc...`
    ViNewsCanonical,
    /// `/tin-tuc...`
    ViDefaultRewrite,
    /// `/en...` outside the admin subtree
    EnglishLocaleRedirect,
    /// Any path with an `admin` segment.
    Admin,
    /// Bare paths served from the English tree.
    DefaultLocaleRewrite,
    Public,
}

type Classifier = fn(&RouteTable, &str) -> bool;

/// Checked top to bottom, the first match wins.
const CLASSIFIERS: [(PathClass, Classifier); 8] = [
    (PathClass::Ignored, is_ignored),
    (PathClass::LegacyLocaleAdmin, is_legacy_locale_admin),
    (PathClass::LegacyNewsAlias, is_legacy_news_alias),
    (PathClass::ViNewsCanonical, is_vi_news),
    (PathClass::ViDefaultRewrite, is_bare_news),
    (PathClass::EnglishLocaleRedirect, is_english_locale),
    (PathClass::Admin, is_admin),
    (PathClass::DefaultLocaleRewrite, is_implicit_english),
];

impl PathClass {
    pub fn of(table: &RouteTable, path: &str) -> PathClass {
        CLASSIFIERS
            .iter()
            .find(|(_, matches)| matches(table, path))
            .map(|(class, _)| *class)
            .unwrap_or(PathClass::Public)
    }
}

/// `path` is `base` itself or lives below it.
pub fn is_under(path: &str, base: &str) -> bool {
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn is_admin_path(path: &str) -> bool {
    path.split('/').any(|segment| segment == ADMIN_SEGMENT)
}

/// Everything from the `admin` segment onward, e.g. `/x/admin/users` gives
/// `/admin/users`.
pub fn admin_relative(path: &str) -> Option<&str> {
    let mut offset: usize = 0;
    for segment in path.split('/') {
        if segment == ADMIN_SEGMENT {
            return Some(&path[offset.saturating_sub(1)..]);
        }
        offset += segment.len() + 1;
    }
    None
}

fn first_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}

fn is_ignored(table: &RouteTable, path: &str) -> bool {
    path == table.favicon_path
        || table
            .ignored_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
}

fn is_legacy_locale_admin(_table: &RouteTable, path: &str) -> bool {
    LEGACY_ADMIN_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

fn is_legacy_news_alias(_table: &RouteTable, path: &str) -> bool {
    is_under(path, NEWS_LEGACY_VI)
}

fn is_vi_news(_table: &RouteTable, path: &str) -> bool {
    is_under(path, NEWS_VI)
}

fn is_bare_news(_table: &RouteTable, path: &str) -> bool {
    is_under(path, NEWS)
}

fn is_english_locale(_table: &RouteTable, path: &str) -> bool {
    is_under(path, LOCALE_EN) && !is_admin_path(path)
}

fn is_admin(_table: &RouteTable, path: &str) -> bool {
    is_admin_path(path)
}

fn is_implicit_english(table: &RouteTable, path: &str) -> bool {
    let segment = first_segment(path);
    !segment.is_empty()
        && !is_under(path, LOCALE_VI)
        && !table.root_allowlist.contains(segment)
}
