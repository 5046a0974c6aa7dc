//! User-Agent string sent with every feed and artifact request.

/// Default User-Agent (identifies the tool and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("firmware-fetch/{version}")
}
