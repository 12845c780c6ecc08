use super::classify::{PathClass, LOCALE_EN, LOCALE_VI, NEWS_LEGACY_VI, NEWS_VI};
use super::table::RouteTable;
use super::{Decision, RedirectStatus};

/// Classifies `path` and applies the locale and legacy-URL rules.
///
/// `Some(PassThrough)` means the request is ignored entirely and no later stage
/// may run. `None` means the cascade had nothing to say and the request moves on
/// to the dynamic redirect lookup or the admin guard.
pub fn evaluate(table: &RouteTable, path: &str) -> (PathClass, Option<Decision>) {
    let class = PathClass::of(table, path);
    (class, resolve(class, path))
}

pub fn resolve(class: PathClass, path: &str) -> Option<Decision> {
    match class {
        PathClass::Ignored => Some(Decision::PassThrough),
        PathClass::LegacyLocaleAdmin => Some(Decision::redirect(
            &path[LOCALE_EN.len()..],
            RedirectStatus::MovedPermanently,
        )),
        PathClass::LegacyNewsAlias => Some(Decision::redirect(
            format!("{NEWS_VI}{}", &path[NEWS_LEGACY_VI.len()..]),
            RedirectStatus::PermanentRedirect,
        )),
        PathClass::ViNewsCanonical => {
            let rest = path[NEWS_VI.len()..].trim_start_matches('/');
            Some(Decision::redirect(
                format!("/{rest}"),
                RedirectStatus::PermanentRedirect,
            ))
        }
        PathClass::ViDefaultRewrite => Some(Decision::rewrite(format!("{LOCALE_VI}{path}"))),
        PathClass::EnglishLocaleRedirect => {
            let rest = &path[LOCALE_EN.len()..];
            let target = if rest.is_empty() { "/" } else { rest };
            Some(Decision::redirect(target, RedirectStatus::PermanentRedirect))
        }
        PathClass::DefaultLocaleRewrite => Some(Decision::rewrite(format!("{LOCALE_EN}{path}"))),
        PathClass::Admin | PathClass::Public => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CommonConfig;
    use crate::edge::config::RoutesConfig;

    use super::*;

    fn eval(path: &str) -> Option<Decision> {
        let table = RoutesConfig::default().build().unwrap();
        evaluate(&table, path).1
    }

    fn permanent(location: &str) -> Option<Decision> {
        Some(Decision::redirect(
            location,
            RedirectStatus::PermanentRedirect,
        ))
    }

    #[test]
    fn test_ignored() {
        for path in [
            "/_next/static/a.js",
            "/api/whatever",
            "/uploads/x.jpg",
            "/images/y.png",
            "/favicon.ico",
        ] {
            assert_eq!(eval(path), Some(Decision::PassThrough), "path {path}");
        }
    }

    #[test]
    fn test_legacy_locale_admin() {
        for x in ["", "/", "/bookings", "/bookings/5/edit", "/login"] {
            for locale in ["/en", "/vi"] {
                let path = format!("{locale}/admin{x}");
                assert_eq!(
                    eval(&path),
                    Some(Decision::redirect(
                        format!("/admin{x}"),
                        RedirectStatus::MovedPermanently
                    )),
                    "path {path}"
                );
            }
        }
    }

    #[test]
    fn test_news() {
        assert_eq!(eval("/vi/news"), permanent("/vi/tin-tuc"));
        assert_eq!(eval("/vi/news/abc"), permanent("/vi/tin-tuc/abc"));

        assert_eq!(eval("/vi/tin-tuc"), permanent("/"));
        assert_eq!(eval("/vi/tin-tuc/"), permanent("/"));
        assert_eq!(eval("/vi/tin-tuc/abc"), permanent("/abc"));
        assert_eq!(eval("/vi/tin-tuc/abc/def"), permanent("/abc/def"));

        assert_eq!(eval("/tin-tuc"), Some(Decision::rewrite("/vi/tin-tuc")));
        assert_eq!(
            eval("/tin-tuc/abc"),
            Some(Decision::rewrite("/vi/tin-tuc/abc"))
        );
    }

    #[test]
    fn test_english_locale() {
        assert_eq!(eval("/en"), permanent("/"));
        assert_eq!(eval("/en/"), permanent("/"));
        assert_eq!(eval("/en/some-post"), permanent("/some-post"));
        assert_eq!(eval("/en/x/admin"), None);
    }

    #[test]
    fn test_default_locale_rewrite() {
        assert_eq!(
            eval("/random-slug"),
            Some(Decision::rewrite("/en/random-slug"))
        );
        assert_eq!(eval("/a/b/c"), Some(Decision::rewrite("/en/a/b/c")));

        for path in [
            "/contact",
            "/dich-vu",
            "/dich-vu/massage",
            "/good-massage-in-da-nang",
            "/price-list",
            "/vi",
            "/vi/anything",
            "/",
            "/admin/bookings",
        ] {
            assert_eq!(eval(path), None, "path {path}");
        }
    }
}
