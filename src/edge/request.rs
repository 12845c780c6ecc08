use actix_web::cookie::Cookie;
use actix_web::http::{header, Method};
use actix_web::HttpRequest;
use reqwest::Url;

const NORMALIZE_BASE: &str = "http://edge.invalid/";

/// Resolves `.`/`..` segments (including `%2e` forms) and backslashes the same
/// way the forwarding client's URL parser does, so the path that is checked is
/// the path the upstream renders.
pub fn normalize_path(raw: &str) -> String {
    let mut url = match Url::parse(NORMALIZE_BASE) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };
    url.set_path(raw);
    url.path().to_string()
}

/// The parts of an inbound request the edge pipeline looks at.
#[derive(Debug, Clone)]
pub struct EdgeRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    /// Raw `Cookie` header, forwarded as-is to the session check.
    pub cookie: Option<String>,
}

impl EdgeRequest {
    pub fn new(method: Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };
        Self {
            method,
            path: normalize_path(path),
            query: String::from(query),
            cookie: None,
        }
    }

    pub fn get(path_and_query: &str) -> Self {
        Self::new(Method::GET, path_and_query)
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        self.cookie = if cookie.trim().is_empty() {
            None
        } else {
            Some(cookie)
        };
        self
    }

    /// Reports whether a cookie with this name is present. The value is opaque
    /// and never inspected.
    pub fn has_cookie(&self, name: &str) -> bool {
        let raw = match self.cookie.as_deref() {
            Some(raw) => raw,
            None => return false,
        };
        raw.split(';')
            .filter_map(|pair| Cookie::parse(pair.trim()).ok())
            .any(|cookie| cookie.name() == name)
    }

    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        format!("{}?{}", self.path, self.query)
    }
}

impl From<&HttpRequest> for EdgeRequest {
    fn from(req: &HttpRequest) -> Self {
        let cookies: Vec<&str> = req
            .headers()
            .get_all(header::COOKIE)
            .filter_map(|v| v.to_str().ok())
            .collect();
        let cookie = if cookies.is_empty() {
            None
        } else {
            Some(cookies.join("; "))
        };

        Self {
            method: req.method().clone(),
            path: normalize_path(req.path()),
            query: req.query_string().to_string(),
            cookie,
        }
    }
}
