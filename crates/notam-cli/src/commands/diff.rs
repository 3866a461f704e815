use anyhow::Result;
use notam_core::{identity, RawNotam};
use std::path::Path;

use super::read_briefing;

pub fn handle(previous: &Path, current: &Path) -> Result<()> {
    let previous = read_briefing(previous)?;
    let current = read_briefing(current)?;

    let (added, removed) = compare(&previous, &current);

    println!("New ({}):", added.len());
    for notam in &added {
        println!("  + {}", describe(notam));
    }

    println!("Gone ({}):", removed.len());
    for notam in &removed {
        println!("  - {}", describe(notam));
    }

    Ok(())
}

/// Notices only in `current`, and notices only in `previous`
fn compare<'a>(
    previous: &'a [RawNotam],
    current: &'a [RawNotam],
) -> (Vec<&'a RawNotam>, Vec<&'a RawNotam>) {
    let new_keys = identity::find_new(current, &identity::keys(previous));
    let gone_keys = identity::find_new(previous, &identity::keys(current));

    let added = current
        .iter()
        .filter(|n| new_keys.contains(&identity::key(n)))
        .collect();
    let removed = previous
        .iter()
        .filter(|n| gone_keys.contains(&identity::key(n)))
        .collect();

    (added, removed)
}

fn describe(notam: &RawNotam) -> String {
    format!(
        "{} {} {}",
        notam.id.as_deref().unwrap_or("-"),
        notam.location.as_deref().unwrap_or("-"),
        notam.q_code.as_deref().unwrap_or("-"),
    )
}
