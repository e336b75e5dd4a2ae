//! Proxy group listing, selection, and latency test handlers.

use serde::Serialize;
use tabled::Tabled;

use mihoctl_core::{Controller, LatencyOutcome, ProbeSettings, ProxyGroup, ProxyListing};

use crate::cli::{GlobalOpts, TestArgs, TestGroupArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Selected")]
    selected: String,
    #[tabled(rename = "Members")]
    members: usize,
}

impl From<&ProxyGroup> for GroupRow {
    fn from(g: &ProxyGroup) -> Self {
        Self {
            name: g.name.clone(),
            kind: g.kind.clone(),
            selected: g.selected.clone().unwrap_or_else(|| "-".into()),
            members: g.members.len(),
        }
    }
}

/// One member of a group as shown by `list <group>`.
#[derive(Serialize)]
struct MemberView {
    name: String,
    kind: String,
    udp: bool,
    selected: bool,
    latency: Option<LatencyOutcome>,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "")]
    mark: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "UDP")]
    udp: String,
    #[tabled(rename = "Latency")]
    latency: String,
}

#[derive(Serialize)]
struct ProbeResult {
    node: String,
    latency: LatencyOutcome,
}

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Error")]
    error: String,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn find_group<'a>(listing: &'a ProxyListing, group: &str) -> Result<&'a ProxyGroup, CliError> {
    listing.groups.get(group).ok_or_else(|| CliError::NotFound {
        message: format!("group '{group}'"),
        list_command: "list".into(),
    })
}

fn members_of(listing: &ProxyListing, group: &ProxyGroup) -> Vec<MemberView> {
    group
        .members
        .iter()
        .map(|name| {
            let node = listing.nodes.get(name);
            MemberView {
                name: name.clone(),
                kind: node.map(|n| n.kind.clone()).unwrap_or_default(),
                udp: node.is_some_and(|n| n.udp),
                selected: group.is_selected(name),
                latency: node.and_then(|n| n.latest().cloned()),
            }
        })
        .collect()
}

fn probe_settings(controller: &Controller, url: Option<String>) -> ProbeSettings {
    let mut probe = (*controller.probe_settings()).clone();
    if let Some(url) = url {
        probe.test_url = url;
    }
    probe
}

fn failure_reason(outcome: &LatencyOutcome) -> String {
    match outcome {
        LatencyOutcome::Failed(reason) => reason.clone(),
        LatencyOutcome::Millis(_) => String::new(),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(
    controller: &Controller,
    group: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let listing = controller.proxies().await?;
    let color = output::should_color(&global.color);

    let out = match group {
        None => {
            let groups: Vec<&ProxyGroup> = listing.groups.values().collect();
            output::render_list(&global.output, &groups, |g| GroupRow::from(*g), |g| {
                g.name.clone()
            })
        }
        Some(name) => {
            let group = find_group(&listing, name)?;
            let members = members_of(&listing, group);
            output::render_list(
                &global.output,
                &members,
                |m| MemberRow {
                    mark: output::selected_mark(m.selected, color),
                    name: m.name.clone(),
                    kind: m.kind.clone(),
                    udp: if m.udp { "yes".into() } else { String::new() },
                    latency: output::latency_cell(m.latency.as_ref(), color),
                },
                |m| m.name.clone(),
            )
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn select(
    controller: &Controller,
    group: &str,
    proxy: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let listing = controller.select_proxy(group, proxy).await?;

    // The daemon answers 204 even when a URLTest group ignores the
    // request, so trust the refreshed listing rather than the status.
    let now = find_group(&listing, group)?;
    if !now.is_selected(proxy) {
        return Err(CliError::Protocol {
            message: format!(
                "'{group}' still selects '{}' after the request",
                now.selected.as_deref().unwrap_or("-")
            ),
        });
    }

    if !global.quiet {
        eprintln!("✓ {group} → {proxy}");
    }
    Ok(())
}

pub async fn test(
    controller: &Controller,
    args: TestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let probe = probe_settings(controller, args.url);
    let latency = controller.test_latency(&args.proxy, &probe).await;

    if let LatencyOutcome::Failed(reason) = latency {
        return Err(CliError::ProbeFailed {
            node: args.proxy,
            reason,
        });
    }

    let color = output::should_color(&global.color);
    let result = ProbeResult {
        node: args.proxy,
        latency,
    };
    let out = output::render_single(
        &global.output,
        &result,
        |r| format!("{}  {}", r.node, output::latency_cell(Some(&r.latency), color)),
        |r| r.latency.millis().map(|ms| ms.to_string()).unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn test_group(
    controller: &Controller,
    args: TestGroupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let listing = controller.proxies().await?;
    let group = find_group(&listing, &args.group)?;
    let probe = probe_settings(controller, args.url);

    let mut outcomes = controller
        .test_group(&group.name, &group.members, &probe)
        .await;
    // Present in group order regardless of completion order.
    outcomes.sort_by_key(|(node, _)| group.members.iter().position(|m| m == node));

    let results: Vec<ProbeResult> = outcomes
        .into_iter()
        .map(|(node, latency)| ProbeResult { node, latency })
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &results,
        |r| ProbeRow {
            name: r.node.clone(),
            latency: output::latency_cell(Some(&r.latency), color),
            error: failure_reason(&r.latency),
        },
        |r| {
            let value = r.latency.millis().map_or_else(|| "failed".into(), |ms| ms.to_string());
            format!("{}\t{value}", r.node)
        },
    );
    output::print_output(&out, global.quiet);

    let failed: Vec<&ProbeResult> = results.iter().filter(|r| r.latency.is_failed()).collect();
    if !failed.is_empty() && !global.quiet {
        let noun = if failed.len() == 1 { "node" } else { "nodes" };
        eprintln!("{} {noun} failed:", failed.len());
        for r in failed {
            eprintln!("  {}: {}", r.node, failure_reason(&r.latency));
        }
    }
    Ok(())
}
