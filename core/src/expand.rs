//! # Address Expansion
//!
//! Turns the configured address source (inline list or line-oriented file)
//! into the concrete candidate list. IPv4 ranges are sampled one address per
//! /24 block unless test-all mode enumerates them fully; IPv6 prefixes yield
//! one sampled address each. Output order follows input order.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use anyhow::Context;
use edgerank_common::config::Config;
use ipnetwork::IpNetwork;
use rand::Rng;

/// Addresses covered by one IPv4 /24 block.
const BLOCK_SIZE: u64 = 256;

/// Expands the configured source into candidate addresses.
///
/// Fails when no source is available, the file is unreadable, or an entry
/// does not parse; the pipeline never runs on a partial candidate list.
pub fn load_candidates(cfg: &Config, rng: &mut impl Rng) -> anyhow::Result<Vec<IpAddr>> {
    let entries: Vec<String> = source_entries(cfg)?;
    let mut candidates: Vec<IpAddr> = Vec::new();
    for entry in &entries {
        expand_entry(entry, cfg.test_all, rng, &mut candidates)
            .with_context(|| format!("invalid address entry '{entry}'"))?;
    }
    Ok(candidates)
}

/// Collects raw entries, inline text taking precedence over the file.
fn source_entries(cfg: &Config) -> anyhow::Result<Vec<String>> {
    if let Some(text) = &cfg.ip_text {
        let entries: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if !entries.is_empty() {
            return Ok(entries);
        }
    }

    let Some(path) = &cfg.ip_file else {
        anyhow::bail!("no address source: supply an inline list or a source file");
    };
    let raw: String = fs::read_to_string(path)
        .with_context(|| format!("address file '{}' is unreadable", path.display()))?;
    let entries: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    if entries.is_empty() {
        anyhow::bail!(
            "address file '{}' contains no usable entries",
            path.display()
        );
    }
    Ok(entries)
}

/// Expands a single literal address or CIDR entry into `out`.
pub fn expand_entry(
    entry: &str,
    test_all: bool,
    rng: &mut impl Rng,
    out: &mut Vec<IpAddr>,
) -> anyhow::Result<()> {
    // Literal addresses pass through unchanged.
    if let Ok(addr) = entry.parse::<IpAddr>() {
        out.push(addr);
        return Ok(());
    }

    match entry.parse::<IpNetwork>()? {
        IpNetwork::V4(net) => expand_v4(net, test_all, rng, out),
        IpNetwork::V6(net) => out.push(sample_v6(net, rng)),
    }
    Ok(())
}

fn expand_v4(
    net: ipnetwork::Ipv4Network,
    test_all: bool,
    rng: &mut impl Rng,
    out: &mut Vec<IpAddr>,
) {
    let start: u32 = net.network().into();
    let end: u32 = net.broadcast().into();

    if net.prefix() == 32 {
        out.push(IpAddr::V4(net.network()));
        return;
    }

    if test_all {
        out.extend((start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip))));
        return;
    }

    if net.prefix() > 24 {
        // Sub-/24 range: one uniform pick from whatever the prefix covers.
        let offset: u32 = rng.random_range(0..=(end - start));
        out.push(IpAddr::V4(Ipv4Addr::from(start + offset)));
        return;
    }

    // One uniform pick per /24 block, in block order.
    let mut block: u64 = u64::from(start);
    while block <= u64::from(end) {
        let offset: u64 = rng.random_range(0..BLOCK_SIZE);
        out.push(IpAddr::V4(Ipv4Addr::from((block + offset) as u32)));
        block += BLOCK_SIZE;
    }
}

/// One uniform pick from an IPv6 prefix; a /128 passes through.
fn sample_v6(net: ipnetwork::Ipv6Network, rng: &mut impl Rng) -> IpAddr {
    let base: u128 = net.network().into();
    let host_bits: u32 = 128 - u32::from(net.prefix());
    if host_bits == 0 {
        return IpAddr::V6(net.network());
    }
    let mask: u128 = if host_bits == 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    };
    let sample: u128 = base | (rng.random::<u128>() & mask);
    IpAddr::V6(Ipv6Addr::from(sample))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
