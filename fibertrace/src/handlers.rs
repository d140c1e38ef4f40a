use crate::config::Settings;
use crate::render::TextRenderer;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, Utc};
use clap::ArgMatches;
use colored::Colorize;
use fibertrace_core::export::{ExportScope, save_export};
use fibertrace_core::fault::{FaultReport, locate_fault};
use fibertrace_core::geo::great_circle_km;
use fibertrace_core::summary::{GlobalSummary, NetworkSummary};
use fibertrace_core::table::{TableRow, distance_table, filter_rows, search_nodes};
use fibertrace_core::validate::{TopologyIssue, validate};
use fibertrace_core::{
    Coordinate, DistanceUnit, LoadApplied, LoadToken, Network, NetworkSet, Node, NodeKind,
    PathBreak, PathOutcome, TopologyError, ViewState,
};
use fibertrace_net::{ProbeAttempt, ProbeConfig, ProbeOutcome, Prober, TopologyClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// ============================================================================
// Loading
// ============================================================================

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

pub async fn load_networks(settings: &Settings, quiet: bool) -> Result<NetworkSet> {
    let source = settings.topology_source()?;
    let client = TopologyClient::with_timeout(settings.timeout_secs)?;

    let pb = spinner(quiet, format!("Loading topology from {}", source));
    let result = client.fetch(&source).await;
    pb.finish_and_clear();

    result.with_context(|| format!("Failed to load topology from {}", source))
}

/// Looks a network up by map id, then by name (case-insensitive). Without a
/// name the first network of the document is used.
pub fn select_network<'a>(set: &'a NetworkSet, wanted: Option<&str>) -> Result<&'a Network> {
    let Some(wanted) = wanted else {
        return set
            .first()
            .ok_or_else(|| anyhow!("The topology document contains no networks"));
    };

    set.get(wanted)
        .or_else(|| set.iter().find(|n| n.name().eq_ignore_ascii_case(wanted)))
        .ok_or_else(|| {
            anyhow!(
                "Unknown network '{}' (available: {})",
                wanted,
                set.ids().join(", ")
            )
        })
}

/// Switches `view` to the wanted network, if one was asked for
fn show_network(
    view: &mut ViewState,
    wanted: Option<&str>,
    renderer: &mut TextRenderer,
) -> Result<()> {
    let Some(wanted) = wanted else {
        return Ok(());
    };
    let networks = view.networks().ok_or(TopologyError::NothingLoaded)?;
    let map_id = select_network(networks, Some(wanted))?.map_id().to_string();
    if view.current_network()?.map_id() != map_id {
        view.select_network(&map_id, renderer)?;
    }
    Ok(())
}

fn open_view(
    networks: NetworkSet,
    settings: &Settings,
    renderer: &mut TextRenderer,
) -> Result<ViewState> {
    let mut view = ViewState::new(settings.unit);
    let token = view.begin_load();
    view.finish_load(token, networks, renderer);
    show_network(&mut view, settings.network.as_deref(), renderer)?;
    Ok(view)
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render_trace(network: &Network, outcome: &PathOutcome, unit: DistanceUnit) -> String {
    let path = outcome.path();
    let mut out = format!(
        "Path to {} in {}\n",
        path.target().bold(),
        network.name()
    );

    if path.is_empty() && outcome.is_complete() {
        out.push_str(&format!("  {} is the DC office, the path is empty\n", path.target()));
        return out;
    }

    for (hop, edge) in path.edges().iter().enumerate() {
        out.push_str(&format!(
            "  {:>2}. {} -> {}  {}\n",
            hop + 1,
            edge.from,
            edge.to,
            unit.format_with_label(edge.distance)
        ));
    }
    out.push_str(&format!(
        "Total: {} over {} segment(s)\n",
        unit.format_with_label(path.total_distance()),
        path.len()
    ));

    if let Some(reason) = outcome.reason() {
        out.push_str(&format!(
            "{} Partial path: {}\n",
            "⚠".yellow().bold(),
            reason
        ));
    }
    out
}

fn segment_cell(row: &TableRow, unit: DistanceUnit) -> String {
    if row.kind == NodeKind::DcOffice && row.connected_to.is_none() {
        "-".to_string()
    } else {
        unit.format(row.segment_distance)
    }
}

pub fn render_table(rows: &[&TableRow], unit: DistanceUnit) -> String {
    let headers = [
        "Point".to_string(),
        "Type".to_string(),
        "Connected To".to_string(),
        format!("Segment ({})", unit.label()),
        format!("Total ({})", unit.label()),
        "Latitude".to_string(),
        "Longitude".to_string(),
    ];

    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|row| {
            [
                row.point.clone(),
                row.kind.label().to_string(),
                row.connected_to.clone().unwrap_or_else(|| "-".to_string()),
                segment_cell(row, unit),
                unit.format(row.total_distance),
                format!("{:.6}", row.position.latitude),
                format!("{:.6}", row.position.longitude),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |line: &[String]| -> String {
        line.iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(headers.as_slice()));
    out.push('\n');
    for line in &cells {
        out.push_str(&format_line(line.as_slice()));
        out.push('\n');
    }
    out
}

fn summary_lines(out: &mut String, summary: &NetworkSummary, unit: DistanceUnit) {
    out.push_str(&format!(
        "  Total cable length: {}\n",
        unit.format_with_label(summary.total_cable_length)
    ));
    out.push_str(&format!(
        "  Max coverage:       {}\n",
        unit.format_with_label(summary.max_coverage)
    ));
    out.push_str(&format!("  Total points:       {}\n", summary.total_points));
}

pub fn render_summary(set: &NetworkSet, unit: DistanceUnit) -> String {
    let mut out = String::new();

    for network in set.iter() {
        out.push_str(&format!("{} ({})\n", network.name().bold(), network.map_id()));
        summary_lines(&mut out, &NetworkSummary::compute(network), unit);
    }

    let global = GlobalSummary::compute(set);
    out.push_str(&format!("{}\n", "Overall".bold()));
    out.push_str(&format!("  Networks:             {}\n", global.total_networks));
    out.push_str(&format!(
        "  Combined cable length: {}\n",
        unit.format_with_label(global.combined_cable_length)
    ));
    out.push_str(&format!("  Total points:         {}\n", global.total_points));
    out.push_str(&format!(
        "  Max coverage:         {}\n",
        unit.format_with_label(global.max_coverage_overall)
    ));

    if let Some(declared) = set.declared_global()
        && declared.total_points != global.total_points
    {
        out.push_str(&format!(
            "{} Document declares {} points overall, run `fibertrace validate` for details\n",
            "⚠".yellow().bold(),
            declared.total_points
        ));
    }
    out
}

pub fn render_issues(network: &Network, issues: &[TopologyIssue]) -> String {
    if issues.is_empty() {
        return format!(
            "{} {} ({}) is a valid tree\n",
            "✓".green().bold(),
            network.name(),
            network.map_id()
        );
    }

    let mut out = format!(
        "{} {} ({}): {} issue(s)\n",
        "✗".red().bold(),
        network.name(),
        network.map_id(),
        issues.len()
    );
    for issue in issues {
        out.push_str(&format!("  - {}\n", issue));
    }
    out
}

pub fn render_search(hits: &[&Node], unit: DistanceUnit) -> String {
    if hits.is_empty() {
        return "No matching nodes\n".to_string();
    }

    let mut out = String::new();
    for node in hits {
        let parent = node
            .parent_id
            .as_deref()
            .map(|p| format!(", connected to {}", p))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} [{}] {} from the DC office{} ({:.6}, {:.6})\n",
            node.id.bold(),
            node.kind.label(),
            unit.format_with_label(node.total_distance),
            parent,
            node.position.latitude,
            node.position.longitude
        ));
    }
    out
}

pub fn render_fault(report: &FaultReport, unit: DistanceUnit) -> String {
    let mut out = String::new();

    for (id, outcome) in &report.outcomes {
        let hops = outcome.edges().len();
        let total = unit.format_with_label(outcome.path().total_distance());
        match outcome.reason() {
            None => out.push_str(&format!("  {} {} hop(s), {}\n", id.bold(), hops, total)),
            Some(reason) => out.push_str(&format!(
                "  {} {} ({})\n",
                id.bold(),
                "path incomplete".yellow(),
                reason
            )),
        }
    }
    for id in &report.unknown {
        out.push_str(&format!("  {} {}\n", id.bold(), "not in this network".red()));
    }

    match &report.common_upstream {
        Some(node) => out.push_str(&format!(
            "{} Most likely fault point: {}\n",
            "→".blue(),
            node.bold()
        )),
        None => out.push_str("No common upstream node for the affected ids\n"),
    }
    out
}

pub fn render_probe_attempt(index: usize, attempt: &ProbeAttempt) -> String {
    match (&attempt.status, &attempt.error) {
        (Some(status), _) => format!("[#{}] {} responded with {}", index + 1, attempt.url, status),
        (None, Some(error)) => format!("[#{}] {} unreachable: {}", index + 1, attempt.url, error),
        (None, None) => format!("[#{}] {} gave no answer", index + 1, attempt.url),
    }
}

/// Where an export goes: `None` means stdout. Without `-o` the dated file
/// name is used in the current directory; a directory gets it appended.
pub fn export_destination(output: Option<&Path>, file_name: &str) -> Option<PathBuf> {
    match output {
        None => Some(PathBuf::from(file_name)),
        Some(path) if path.as_os_str() == "-" => None,
        Some(path) if path.is_dir() => Some(path.join(file_name)),
        Some(path) => Some(path.to_path_buf()),
    }
}

// ============================================================================
// Commands
// ============================================================================

pub async fn handle_trace(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let target = args
        .get_one::<String>("TARGET")
        .ok_or_else(|| anyhow!("A target node is required"))?;

    let networks = load_networks(settings, quiet).await?;
    let mut renderer = TextRenderer::new();
    let mut view = open_view(networks, settings, &mut renderer)?;

    let outcome = view.trace(target, &mut renderer)?;
    let network = view.current_network()?;

    if outcome.reason() == Some(&PathBreak::UnknownTarget) {
        bail!("No node '{}' in {} ({})", target, network.name(), network.map_id());
    }

    print!("{}", render_trace(network, &outcome, view.unit()));
    if args.get_flag("map") {
        println!();
        print!("{}", renderer.render(network, view.unit()));
    }
    Ok(())
}

pub async fn handle_table(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let networks = load_networks(settings, quiet).await?;
    let network = select_network(&networks, settings.network.as_deref())?;

    let rows = distance_table(network);
    let query = args.get_one::<String>("filter").map(String::as_str).unwrap_or("");
    let shown = filter_rows(&rows, query, settings.unit);

    if !quiet {
        println!("{} ({})", network.name().bold(), network.map_id());
    }
    if shown.is_empty() {
        println!("No rows match '{}'", query);
        return Ok(());
    }
    print!("{}", render_table(&shown, settings.unit));
    Ok(())
}

pub async fn handle_export(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let networks = load_networks(settings, quiet).await?;
    let scope = if args.get_flag("all") {
        ExportScope::All(&networks)
    } else {
        ExportScope::Network(select_network(&networks, settings.network.as_deref())?)
    };

    let csv = scope.to_csv(settings.unit);
    let file_name = scope.file_name(Utc::now().date_naive());
    let output = args.get_one::<PathBuf>("output").map(PathBuf::as_path);

    match export_destination(output, &file_name) {
        None => print!("{}", csv),
        Some(path) => {
            save_export(&csv, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", csv.len(), path.display());
            if !quiet {
                println!("{} Exported to {}", "✓".green().bold(), path.display());
            }
        }
    }
    Ok(())
}

pub async fn handle_summary(settings: &Settings, quiet: bool) -> Result<()> {
    let networks = load_networks(settings, quiet).await?;
    print!("{}", render_summary(&networks, settings.unit));
    Ok(())
}

pub async fn handle_validate(settings: &Settings, quiet: bool) -> Result<()> {
    let networks = load_networks(settings, quiet).await?;

    let mut total = 0;
    for network in networks.iter() {
        let issues = validate(network);
        total += issues.len();
        print!("{}", render_issues(network, &issues));
    }

    if total > 0 {
        bail!("{} issue(s) found", total);
    }
    Ok(())
}

pub async fn handle_search(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let query = args
        .get_one::<String>("QUERY")
        .ok_or_else(|| anyhow!("A search query is required"))?;

    let networks = load_networks(settings, quiet).await?;
    let network = select_network(&networks, settings.network.as_deref())?;
    print!("{}", render_search(&search_nodes(network, query), settings.unit));
    Ok(())
}

pub fn handle_measure(args: &ArgMatches, settings: &Settings) -> Result<()> {
    let coordinate = |name: &str| -> Result<f64> {
        args.get_one::<f64>(name)
            .copied()
            .ok_or_else(|| anyhow!("{} is required", name))
    };
    let a = Coordinate::new(coordinate("LAT1")?, coordinate("LON1")?);
    let b = Coordinate::new(coordinate("LAT2")?, coordinate("LON2")?);

    for c in [a, b] {
        if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) {
            bail!("({}, {}) is not a valid coordinate", c.latitude, c.longitude);
        }
    }

    println!("{}", settings.unit.format_with_label(great_circle_km(a, b)));
    Ok(())
}

pub async fn handle_fault(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let ids: Vec<&str> = args
        .get_many::<String>("ID")
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default();

    let networks = load_networks(settings, quiet).await?;
    let network = select_network(&networks, settings.network.as_deref())?;
    let report = locate_fault(network, &ids);

    print!("{}", render_fault(&report, settings.unit));
    if report.outcomes.is_empty() {
        bail!("None of the given ids exist in {}", network.map_id());
    }
    Ok(())
}

pub async fn handle_probe(settings: &Settings, quiet: bool) -> Result<()> {
    let config = ProbeConfig::load(&settings.redirects)
        .await
        .with_context(|| format!("Failed to read probe targets from {}", settings.redirects.display()))?;

    let mut prober = Prober::with_timeout(settings.timeout_secs)?;
    if !quiet {
        prober = prober.with_progress_callback(Arc::new(|index: usize, attempt: &ProbeAttempt| {
            println!("{}", render_probe_attempt(index, attempt));
        }));
    }

    match prober.probe(&config.redirects).await? {
        ProbeOutcome::Connected { target, .. } => {
            if !quiet {
                println!(
                    "{} {} is up, handing off in {} ms",
                    "✓".green().bold(),
                    target.url,
                    target.delay
                );
            }
            tokio::time::sleep(target.delay()).await;
            println!("{}", target.url.trim());
            Ok(())
        }
        ProbeOutcome::AllDown { attempts } => {
            bail!("All {} configured target(s) are down", attempts.len())
        }
    }
}

pub async fn handle_watch(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let source = settings.topology_source()?;
    let client = Arc::new(TopologyClient::with_timeout(settings.timeout_secs)?);
    let every = Duration::from_secs(args.get_one::<u64>("interval").copied().unwrap_or(30));
    let limit = args.get_one::<u64>("count").copied();
    let target = args.get_one::<String>("TARGET").cloned();

    let mut view = ViewState::new(settings.unit);
    let mut renderer = TextRenderer::new();
    let mut loads: JoinSet<(LoadToken, fibertrace_net::error::Result<NetworkSet>)> = JoinSet::new();
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut applied = 0u64;

    if !quiet {
        println!("Watching {} every {}s (Ctrl-C to stop)", source, every.as_secs());
    }

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !loads.is_empty() {
                    debug!("Reload still in flight, skipping tick");
                    continue;
                }
                let token = view.begin_load();
                let client = client.clone();
                let source = source.clone();
                loads.spawn(async move { (token, client.fetch(&source).await) });
            }
            Some(joined) = loads.join_next() => {
                let (token, result) = joined?;
                let networks = match result {
                    Ok(networks) => networks,
                    Err(e) => {
                        warn!("Reload #{} failed: {}", token.generation(), e);
                        eprintln!("{} Reload failed: {}", "⚠".yellow().bold(), e);
                        continue;
                    }
                };

                if let LoadApplied::Stale { latest, .. } = view.finish_load(token, networks, &mut renderer) {
                    debug!("Reload #{} superseded by #{}", token.generation(), latest.generation());
                    continue;
                }

                show_network(&mut view, settings.network.as_deref(), &mut renderer)?;
                applied += 1;
                print!("{}", render_reload(&mut view, target.as_deref(), &mut renderer)?);

                if limit.is_some_and(|limit| applied >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    loads.abort_all();
    Ok(())
}

/// Status line after an applied reload, plus the re-traced path if any
pub fn render_reload(
    view: &mut ViewState,
    target: Option<&str>,
    renderer: &mut TextRenderer,
) -> Result<String> {
    let outcome = match target {
        Some(target) => Some(view.trace(target, renderer)?),
        None => None,
    };

    let network = view.current_network()?;
    let summary = NetworkSummary::compute(network);
    let mut out = format!(
        "[{}] {} ({}): {} points, {} of cable\n",
        Local::now().format("%H:%M:%S"),
        network.name().bold(),
        network.map_id(),
        summary.total_points,
        view.unit().format_with_label(summary.total_cable_length)
    );

    if let Some(outcome) = outcome {
        if outcome.reason() == Some(&PathBreak::UnknownTarget) {
            out.push_str(&format!(
                "{} '{}' is not in this network\n",
                "⚠".yellow().bold(),
                outcome.path().target()
            ));
        } else {
            out.push_str(&render_trace(network, &outcome, view.unit()));
        }
    }
    Ok(out)
}
