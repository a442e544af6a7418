//! Public IP, ISP and country lookup for the optional info panel.
//!
//! The lookup is best effort: it shells out to `curl` (falling back to
//! `wget`) with a short timeout, runs on a blocking worker of the tokio
//! runtime, and hands its result back through a oneshot channel that the
//! panel polls once per tick. Nothing here can fail the session.

use std::net::Ipv4Addr;
use std::process::{Command, Stdio};
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Services queried in order until one returns a valid IPv4 address.
const IP_URLS: &[&str] = &[
    "http://ifconfig.me",
    "http://checkip.amazonaws.com",
    "http://ipinfo.io/ip",
];
const ORG_URL: &str = "http://ipinfo.io/org";
const COUNTRY_URL: &str = "http://ipinfo.io/country";
const FETCH_TIMEOUT_SECS: &str = "3";

/// Result of an IP lookup, with fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpInfo {
    pub ip: String,
    pub isp: String,
    pub location: String,
}

impl IpInfo {
    /// Placeholder used when no public IP could be determined.
    pub fn unavailable() -> Self {
        Self {
            ip: "Not available".to_string(),
            isp: "No connection".to_string(),
            location: "Unknown".to_string(),
        }
    }
}

/// What the panel shows while visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum IpInfoView {
    Loading,
    Ready(IpInfo),
}

/// Fetches a URL body as a trimmed first line, or `None` on any failure.
pub type Fetcher = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

enum Lookup {
    Idle,
    Pending(oneshot::Receiver<IpInfo>),
    Ready(IpInfo),
}

/// Visibility toggle plus the lazily started lookup behind it.
pub struct IpInfoPanel {
    visible: bool,
    lookup: Lookup,
    runtime: Option<Handle>,
    fetcher: Fetcher,
}

impl std::fmt::Debug for IpInfoPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lookup = match self.lookup {
            Lookup::Idle => "idle",
            Lookup::Pending(_) => "pending",
            Lookup::Ready(_) => "ready",
        };
        f.debug_struct("IpInfoPanel")
            .field("visible", &self.visible)
            .field("lookup", &lookup)
            .finish()
    }
}

impl IpInfoPanel {
    /// A panel that looks up through `curl`/`wget` on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self::with_fetcher(Some(runtime), Arc::new(http_get))
    }

    /// A panel without a runtime; showing it reports the IP as unavailable.
    pub fn disabled() -> Self {
        Self::with_fetcher(None, Arc::new(|_: &str| -> Option<String> { None }))
    }

    pub fn with_fetcher(runtime: Option<Handle>, fetcher: Fetcher) -> Self {
        Self {
            visible: false,
            lookup: Lookup::Idle,
            runtime,
            fetcher,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility, starting the lookup the first time it is shown.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible && matches!(self.lookup, Lookup::Idle) {
            self.start_lookup();
        }
    }

    fn start_lookup(&mut self) {
        let Some(runtime) = self.runtime.as_ref() else {
            self.lookup = Lookup::Ready(IpInfo::unavailable());
            return;
        };

        let (tx, rx) = oneshot::channel();
        let fetcher = self.fetcher.clone();
        runtime.spawn_blocking(move || {
            let info = lookup_ip_info(fetcher.as_ref());
            info!(ip = %info.ip, isp = %info.isp, location = %info.location, "ip lookup finished");
            let _ = tx.send(info);
        });
        self.lookup = Lookup::Pending(rx);
    }

    /// Current panel contents, or `None` while hidden. Never blocks.
    pub fn view(&mut self) -> Option<IpInfoView> {
        if let Lookup::Pending(rx) = &mut self.lookup {
            match rx.try_recv() {
                Ok(info) => self.lookup = Lookup::Ready(info),
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.lookup = Lookup::Ready(IpInfo::unavailable());
                }
            }
        }

        if !self.visible {
            return None;
        }
        match &self.lookup {
            Lookup::Ready(info) => Some(IpInfoView::Ready(info.clone())),
            _ => Some(IpInfoView::Loading),
        }
    }
}

/// Run the full lookup sequence with `fetch`.
pub fn lookup_ip_info(fetch: &(dyn Fn(&str) -> Option<String> + Send + Sync)) -> IpInfo {
    let ip = IP_URLS.iter().find_map(|url| fetch(*url).filter(|body| is_ipv4(body)));
    let Some(ip) = ip else {
        return IpInfo::unavailable();
    };

    let isp = fetch(ORG_URL)
        .filter(|body| !body.is_empty())
        .map(|body| isp_from_org(&body))
        .unwrap_or_else(|| "Unknown ISP".to_string());

    let location = fetch(COUNTRY_URL)
        .filter(|body| !body.is_empty() && body != "undefined")
        .map(|code| country_name(&code))
        .unwrap_or_else(|| "Unknown".to_string());

    IpInfo { ip, isp, location }
}

fn is_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// Strip the AS number from an `ipinfo.io/org` answer such as
/// `AS3320 Deutsche Telekom AG`.
pub fn isp_from_org(org: &str) -> String {
    match org.split_once(' ') {
        Some((prefix, rest)) if prefix.starts_with("AS") => rest.to_string(),
        _ => org.to_string(),
    }
}

/// Full name for common two-letter country codes, the code itself otherwise.
pub fn country_name(code: &str) -> String {
    let name = match code {
        "DE" => "Germany",
        "US" => "USA",
        "GB" => "UK",
        "FR" => "France",
        "ES" => "Spain",
        "IT" => "Italy",
        "NL" => "Netherlands",
        "CH" => "Switzerland",
        "AT" => "Austria",
        "PL" => "Poland",
        "BE" => "Belgium",
        "SE" => "Sweden",
        "NO" => "Norway",
        "DK" => "Denmark",
        "FI" => "Finland",
        "CZ" => "Czech Republic",
        "HU" => "Hungary",
        "RO" => "Romania",
        other => other,
    };
    name.to_string()
}

/// GET `url` with `curl`, then `wget`, returning the first line of the body.
fn http_get(url: &str) -> Option<String> {
    let attempts: [(&str, Vec<&str>); 2] = [
        ("curl", vec!["-s", "--max-time", FETCH_TIMEOUT_SECS, url]),
        ("wget", vec!["-qO-", "--timeout=3", url]),
    ];

    for (program, args) in attempts {
        let output = match Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                debug!(program, error = %e, "fetch tool unavailable");
                continue;
            }
        };
        if !output.status.success() {
            debug!(program, url, status = %output.status, "fetch failed");
            continue;
        }
        let body = String::from_utf8_lossy(&output.stdout);
        let line = body.lines().next().unwrap_or("").trim().to_string();
        return Some(line);
    }
    None
}
