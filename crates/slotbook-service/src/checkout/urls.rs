//! Success and cancel redirect URLs for hosted checkout.

use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;

/// Placeholder the provider replaces with the checkout session id.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Redirect targets handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUrls {
    /// Where the customer lands after paying.
    pub success_url: String,
    /// Where the customer lands after backing out.
    pub cancel_url: String,
}

/// Derive the redirect URLs from the caller's `return_url`.
pub fn build_redirect_urls(return_url: &str) -> AppResult<RedirectUrls> {
    let return_url = return_url.trim();
    let rest = return_url
        .strip_prefix("https://")
        .or_else(|| return_url.strip_prefix("http://"))
        .ok_or_else(|| AppError::validation("return_url must be an absolute http(s) URL"))?;

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(AppError::validation("return_url has no host"));
    }

    Ok(RedirectUrls {
        success_url: append_query(
            return_url,
            &format!("success=true&session_id={SESSION_ID_PLACEHOLDER}"),
        ),
        cancel_url: append_query(return_url, "canceled=true"),
    })
}

/// Append `params` to the query string, keeping any fragment last.
fn append_query(url: &str, params: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with('?') || base.ends_with('&') => "",
        Some(_) => "&",
    };

    match fragment {
        Some(fragment) => format!("{base}{separator}{params}#{fragment}"),
        None => format!("{base}{separator}{params}"),
    }
}
