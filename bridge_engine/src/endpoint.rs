use url::Url;

use crate::bridge_config::BridgeConfig;
use crate::errors::TranslateError;

/// Builds the media server URL from a message's `host` and `port`.
///
/// `host` normally carries its scheme (`http://localhost`); a bare host name is
/// taken as plain http. The port comes from the message when set, then from
/// the host itself, then from the configured default. The path is always `/`.
pub fn resolve_target(host: &str, port: u16, config: &BridgeConfig) -> Result<Url, TranslateError> {
    let host = match host.trim() {
        "" => config.default_host.as_str(),
        host => host,
    };

    let qualified = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    let mut url = Url::parse(&qualified)
        .map_err(|e| TranslateError::invalid_host(format!("invalid host {:?}: {}", host, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TranslateError::invalid_host(format!(
            "unsupported scheme {:?} in host {:?}",
            url.scheme(),
            host
        )));
    }
    if url.host_str().is_none() {
        return Err(TranslateError::invalid_host(format!("host {:?} has no host name", host)));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(TranslateError::invalid_host(format!(
            "host {:?} must not carry credentials",
            host
        )));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(TranslateError::invalid_host(format!(
            "host {:?} must not carry a path, query or fragment",
            host
        )));
    }

    let port = match port {
        0 => url
            .port()
            .or_else(|| authority_port(&qualified))
            .unwrap_or(config.default_port),
        port => port,
    };
    url.set_port(Some(port))
        .map_err(|_| TranslateError::invalid_host(format!("cannot set port {} on {:?}", port, host)))?;

    Ok(url)
}

/// Port written in the authority of `qualified`, including a scheme's default
/// port, which `Url::port` reports as absent.
fn authority_port(qualified: &str) -> Option<u16> {
    let (_, rest) = qualified.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    // a bracketed IPv6 host without a port ends in `]` and fails to parse
    let (_, port) = host_port.rsplit_once(':')?;
    port.parse().ok()
}
