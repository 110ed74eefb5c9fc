//! Submit-time normalization of the raw form values.

use std::net::Ipv4Addr;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConsoleError;

use super::types::{RawValues, ShareCreationRequest, ShareMode};

static QUOTA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[GT]$").expect("quota pattern"));
static SHARENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("sharename pattern"));

/// Normalize and validate a raw value set into a [`ShareCreationRequest`].
///
/// Pruning is strict: fields irrelevant to the selected mode or to disabled
/// features are absent from the result, never empty. The steps run in a fixed
/// order: path derivation, quota format, HA defaults/stripping, AD credential
/// requirements/stripping, VM resource clamping.
pub fn finalize(raw: &RawValues) -> Result<ShareCreationRequest, ConsoleError> {
    let sharename = match raw.get("sharename").and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(ConsoleError::missing_field("sharename")),
    };
    if !SHARENAME_RE.is_match(&sharename) {
        return Err(ConsoleError::invalid_format(
            "sharename",
            "only letters, numbers, underscores, and hyphens allowed",
        ));
    }

    let mode = match raw.get("mode") {
        None => ShareMode::default(),
        Some(v) => {
            let text = v.as_str().unwrap_or_default();
            ShareMode::from_str(text).map_err(|_| {
                ConsoleError::invalid_format("mode", format!("`{text}` is not one of lxc/native/vm"))
            })?
        }
    };

    // Step 1: derive the path from the share name when left blank.
    let path = match raw.get("path").and_then(|v| v.as_str()) {
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        _ => format!("/srv/smb/{sharename}"),
    };

    // Step 2: quota format.
    let quota = match raw.get("quota") {
        Some(v) if !v.is_empty() => {
            let text = v.as_str().unwrap_or_default().trim().to_string();
            if !QUOTA_RE.is_match(&text) {
                return Err(ConsoleError::invalid_format(
                    "quota",
                    "use a number followed by G or T (e.g. 10G, 1T)",
                ));
            }
            Some(text)
        }
        _ => None,
    };

    // Step 3: HA defaults when enabled, full stripping when not.
    let ha_enabled = raw.get("ha_enabled").map(|v| v.as_bool());
    let (ctdb_vip, ha_nodes) = if ha_enabled == Some(true) {
        let vip = match raw.get("ctdb_vip").filter(|v| !v.is_empty()) {
            None => "auto".to_string(),
            Some(v) => {
                let text = v.as_str().unwrap_or_default().trim().to_string();
                if text != "auto" && Ipv4Addr::from_str(&text).is_err() {
                    return Err(ConsoleError::invalid_format(
                        "ctdb_vip",
                        "expected an IPv4 address or `auto`",
                    ));
                }
                text
            }
        };
        let nodes = match raw.get("ha_nodes").filter(|v| !v.is_empty()) {
            None => "all".to_string(),
            Some(v) => {
                let text = v.as_str().unwrap_or_default();
                if text.contains(',') {
                    text.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join(",")
                } else {
                    text.trim().to_string()
                }
            }
        };
        (Some(vip), Some(nodes))
    } else {
        (None, None)
    };

    // Step 4: AD credentials are kept only for an actual join.
    let domain = raw
        .get("ad_domain")
        .filter(|v| !v.is_empty())
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string());
    let joining = raw.get("ad_join").map(|v| v.as_bool());

    let (ad_domain, ad_join, ad_username, ad_password, ad_ou, ad_fallback) = match (&domain, joining)
    {
        (Some(domain), Some(true)) => {
            let password = raw
                .get("ad_password")
                .filter(|v| !v.is_empty())
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| ConsoleError::missing_field("ad_password"))?;
            (
                Some(domain.clone()),
                Some(true),
                non_empty_text(raw, "ad_username"),
                Some(password),
                non_empty_text(raw, "ad_ou"),
                raw.get("ad_fallback").map(|v| v.as_bool()),
            )
        }
        // Domain configured but not joining: keep the domain, drop credentials.
        (Some(domain), joining) => (
            Some(domain.clone()),
            joining.map(|_| false),
            None,
            None,
            None,
            None,
        ),
        // No domain: ad_join itself is stripped along with the credentials.
        (None, _) => (None, None, None, None, None, None),
    };

    // Step 5: VM resources, clamped with defaults; absent for other modes.
    let (vm_memory, vm_cores, vm_template) = if mode == ShareMode::Vm {
        let memory = raw
            .get("vm_memory")
            .and_then(|v| v.as_i64())
            .filter(|n| *n > 0)
            .map(|n| (n as u64).max(512))
            .unwrap_or(2048);
        let cores = raw
            .get("vm_cores")
            .and_then(|v| v.as_i64())
            .filter(|n| *n > 0)
            .map(|n| (n as u32).max(1))
            .unwrap_or(2);
        (Some(memory), Some(cores), non_empty_text(raw, "vm_template"))
    } else {
        (None, None, None)
    };

    Ok(ShareCreationRequest {
        sharename,
        mode,
        path,
        quota,
        ad_domain,
        ad_join,
        ad_username,
        ad_password,
        ad_ou,
        ad_fallback,
        ha_enabled,
        ctdb_vip,
        ha_nodes,
        vm_memory,
        vm_cores,
        vm_template,
    })
}

fn non_empty_text(raw: &RawValues, field: &str) -> Option<String> {
    raw.get(field)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}
