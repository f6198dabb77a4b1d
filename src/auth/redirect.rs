//! Helpers for sending the user back to where they were after logging in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN && path != endpoints::LOG_OUT
}

/// Reduce `raw_url` to a local path and query, or `None` if it points
/// somewhere the user should not be sent after logging in.
pub(crate) fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that will bring the user back to the page `request` asked for.
///
/// Falls back to the plain log-in page if the requested page cannot be round-tripped.
pub(crate) fn build_log_in_redirect_url(request: &Request) -> String {
    let Some(redirect_target) = request
        .uri()
        .path_and_query()
        .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    else {
        tracing::warn!(
            "Invalid redirect URL from request URI {}. Falling back to log-in page.",
            request.uri()
        );
        return endpoints::LOG_IN.to_owned();
    };

    match serde_urlencoded::to_string([("redirect_url", &redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN, param),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN.to_owned()
        }
    }
}
