use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use notam_config::Config;
use notam_core::{identity, EnrichedNotam, FlightContext, IdentityKey, PriorityTier};
use notam_engine::{
    BriefingInputs, BriefingView, FilterState, MemoryStatusStore, ReviewSession, StatusStore,
};
use time::format_description::well_known::Rfc3339;

use super::{read_briefing, read_flight};
use crate::cli::{OutputFormat, ReviewArgs};
use crate::state::JsonStateStore;

pub async fn handle(args: ReviewArgs, config: &Config) -> Result<()> {
    let notams = read_briefing(&args.briefing)?;
    let context = match &args.flight {
        Some(path) => read_flight(path)?,
        None => FlightContext::default(),
    };
    let previous_keys: HashSet<IdentityKey> = match &args.previous {
        Some(path) => identity::keys(&read_briefing(path)?),
        None => HashSet::new(),
    };

    let store: Arc<dyn StatusStore> = match &args.state {
        Some(path) => Arc::new(JsonStateStore::open(path).await?),
        None => Arc::new(MemoryStatusStore::new()),
    };

    let filter = build_filter(&args, config.filter_state());
    let inputs = BriefingInputs::new(notams, context)
        .with_previous_keys(previous_keys)
        .with_filter(filter);

    let session = ReviewSession::open(config.review_engine(), store, inputs).await;
    let view = session.view();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => print_text(view),
    }

    Ok(())
}

/// Apply command-line overrides on top of the configured defaults
fn build_filter(args: &ReviewArgs, mut filter: FilterState) -> FilterState {
    if let Some(query) = &args.query {
        filter.query = query.clone();
    }
    if let Some(group) = args.group {
        filter.grouping = group.into();
    }
    if let Some(width) = args.corridor {
        filter.corridor.enabled = true;
        filter.corridor.width_nm = width;
    }
    filter.priority = args.priority.into();
    filter.status = args.status.into();

    if args.show_helicopter {
        filter.smart.hide_helicopter = false;
    }
    if args.all_obstacles {
        filter.smart.filter_obstacles = false;
    }
    if args.show_ignored {
        filter.visibility.show_ignored = true;
    }
    if args.hide_read {
        filter.visibility.show_read = false;
    }
    if args.any_time {
        filter.time_window.enabled = false;
    }
    filter
}

fn print_text(view: &BriefingView) {
    for group in view.groups.iter().filter(|g| !g.notices.is_empty()) {
        println!("== {} ({})", group.title, group.notices.len());
        for notice in &group.notices {
            print_notice(notice);
        }
        println!();
    }

    let all = &view.stats;
    let shown = &view.visible_stats;
    println!(
        "Showing {} of {} notices ({} hidden by filters)",
        shown.total,
        all.total,
        all.total - shown.total
    );
    println!(
        "  unread: {}  important: {}  follow-up: {}  new: {}  high priority: {}  ignored: {}",
        all.unread, all.important, all.follow_up, all.new, all.high_priority, all.ignored
    );
}

fn print_notice(notice: &EnrichedNotam) {
    let notam = &notice.notam;
    let tier = match notice.priority {
        PriorityTier::High => "HIGH",
        PriorityTier::Normal => "    ",
        PriorityTier::Low => "low ",
    };
    let distance = notice
        .route_distance_nm
        .map(|d| format!("{:.1} nm", d))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "  [{}] {} {} {} {} {}{}",
        tier,
        notam.id.as_deref().unwrap_or("-"),
        notice.location(),
        notam.q_code.as_deref().unwrap_or("-"),
        distance,
        notice.state(),
        if notice.is_new { " NEW" } else { "" }
    );

    if let Some(from) = notam.effective_from.and_then(|t| t.format(&Rfc3339).ok()) {
        let to = notam
            .effective_to
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| "PERM".to_string());
        println!("         {} - {}", from, to);
    }
    for line in notam.message.lines() {
        println!("         {}", line);
    }
    if let Some(note) = &notice.status.note {
        println!("         note: {}", note);
    }
    println!("         key: {}", notice.key.digest());
}
