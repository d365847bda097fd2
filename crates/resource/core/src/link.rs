//! Absolute links for created resources

use axum::http::header::HOST;
use resource_pipeline::{Context, Fault};
use url::Url;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FALLBACK_HOST: &str = "localhost";

/// The URL the request was made to.
///
/// A scheme or host that does not form a valid URL falls back to
/// `http://localhost`, so a malformed `Host` header never fails a request.
pub fn base(ctx: &Context) -> Result<Url, Fault> {
    let uri = ctx.uri();

    let scheme = ctx
        .header(FORWARDED_PROTO)
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    let host = ctx
        .header(HOST.as_str())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or(FALLBACK_HOST);
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    match Url::parse(&format!("{scheme}://{host}{path}")) {
        Ok(url) => Ok(url),
        Err(err) => {
            tracing::debug!(%scheme, %host, error = %err, "Request URL does not parse, linking against localhost");
            Url::parse(&format!("http://{FALLBACK_HOST}{path}"))
                .map_err(|err| Fault::Location(format!("request URL: {err}")))
        }
    }
}

/// Resolve `link` against `base`.
///
/// Relative links resolve against the request path, absolute paths against
/// the request host.
pub fn resolve(base: &Url, link: &str) -> Result<String, Fault> {
    let resolved = base
        .join(link)
        .map_err(|err| Fault::Location(format!("{link}: {err}")))?;
    Ok(resolved.to_string())
}

/// Resolve `link` against the URL the request was made to.
pub fn absolute(ctx: &Context, link: &str) -> Result<String, Fault> {
    resolve(&base(ctx)?, link)
}
