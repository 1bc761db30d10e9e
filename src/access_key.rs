use std::borrow::Borrow;
use std::fmt;

/// The key used to look up expectations, registered errors and access counts: the uppercased
/// HTTP method and the path, separated by a single space - e.g. `GET /widgets`.
///
/// `AccessKey` implements `Borrow<str>`, so maps keyed by `AccessKey` can be queried with a
/// plain string:
///
/// ```rust
/// use http_expect::{AccessKey, ExpectationRouter, Method, Request};
///
/// let mut router = ExpectationRouter::new();
/// router.dispatch(&Request::new(Method::GET, "/widgets")).unwrap();
///
/// assert_eq!(router.accesses_by_path().get("GET /widgets"), Some(&1));
/// assert_eq!(AccessKey::new("get", "/widgets").as_str(), "GET /widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessKey(String);

impl AccessKey {
    pub fn new(method: impl AsRef<str>, path: impl AsRef<str>) -> Self {
        Self(format!(
            "{} {}",
            method.as_ref().to_uppercase(),
            path.as_ref()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AccessKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AccessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
