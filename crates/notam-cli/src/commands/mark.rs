use std::sync::Arc;

use anyhow::{bail, Result};
use notam_config::Config;
use notam_core::{EnrichedNotam, FlightContext, IdentityKey};
use notam_engine::{BriefingInputs, ReviewSession, SessionError};

use super::read_briefing;
use crate::cli::MarkArgs;
use crate::state::JsonStateStore;

pub async fn handle(args: MarkArgs, config: &Config) -> Result<()> {
    if args.status.is_none() && args.note.is_none() && !args.ignore {
        bail!("Nothing to do: pass --status, --note or --ignore");
    }

    let notams = read_briefing(&args.briefing)?;
    let store = Arc::new(JsonStateStore::open(&args.state).await?);
    let inputs = BriefingInputs::new(notams, FlightContext::default());
    let mut session = ReviewSession::open(config.review_engine(), store, inputs).await;

    let key = resolve(&session.view().enriched, &args.notice)?;

    if let Some(state) = args.status {
        session.set_status(&key, state).await.map_err(persist_error)?;
    }
    if let Some(note) = &args.note {
        session.add_note(&key, note).await.map_err(persist_error)?;
    }
    if args.ignore {
        session
            .ignore_globally(&key, args.reason.as_deref())
            .await
            .map_err(persist_error)?;
    }

    let status = session.status(&key);
    println!("✓ {} is now {}", args.notice, status.state);
    if let Some(note) = status.note {
        println!("  Note: {}", note);
    }
    if args.ignore {
        println!("  Ignored in future briefings");
    }

    Ok(())
}

/// Find a notice by its ID or by the digest of its identity key
fn resolve(notices: &[EnrichedNotam], notice: &str) -> Result<IdentityKey> {
    let needle = notice.trim();
    let matches: Vec<&EnrichedNotam> = notices
        .iter()
        .filter(|n| {
            n.notam
                .id
                .as_deref()
                .is_some_and(|id| id.eq_ignore_ascii_case(needle))
                || n.key.digest() == needle.to_ascii_lowercase()
        })
        .collect();

    match matches.as_slice() {
        [] => bail!("No notice matching '{}' in briefing", needle),
        [only] => Ok(only.key.clone()),
        [first, rest @ ..] if rest.iter().all(|n| n.key == first.key) => Ok(first.key.clone()),
        _ => bail!(
            "'{}' matches {} different notices, use the key digest instead",
            needle,
            matches.len()
        ),
    }
}

fn persist_error(e: SessionError) -> anyhow::Error {
    anyhow::Error::new(e).context("Failed to update review state")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::RawNotam;
    use notam_engine::ReviewEngine;

    fn enriched(notams: Vec<RawNotam>) -> Vec<EnrichedNotam> {
        ReviewEngine::default()
            .compute(&BriefingInputs::new(notams, FlightContext::default()))
            .enriched
    }

    #[test]
    fn test_resolve_by_id_and_digest() {
        let notices = enriched(vec![
            RawNotam::new("A0001/24").with_q_code("QMRLC").with_location("LSZH"),
            RawNotam::new("A0002/24").with_q_code("QNVAS").with_location("LSZH"),
        ]);

        assert_eq!(resolve(&notices, "a0002/24").unwrap(), notices[1].key);
        let digest = notices[0].key.digest();
        assert_eq!(resolve(&notices, &digest).unwrap(), notices[0].key);
        assert!(resolve(&notices, "B9999/24").is_err());
    }

    #[test]
    fn test_resolve_ambiguous_id() {
        let notices = enriched(vec![
            RawNotam::new("A1").with_q_code("QMRLC").with_location("LSZH"),
            RawNotam::new("A1").with_q_code("QNVAS").with_location("LSGG"),
        ]);
        assert!(resolve(&notices, "A1").is_err());
    }

    #[tokio::test]
    async fn test_mark_writes_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let briefing = dir.path().join("briefing.json");
        let state = dir.path().join("state.json");
        std::fs::write(
            &briefing,
            r#"[{"id": "A1", "q_code": "QMRLC", "location": "LSZH", "message": "RWY 16 CLSD"}]"#,
        )
        .unwrap();

        let args = MarkArgs {
            briefing: briefing.clone(),
            notice: "A1".to_string(),
            status: Some(notam_core::ReviewState::Important),
            note: Some("check NOTAM B".to_string()),
            ignore: false,
            reason: None,
            state: state.clone(),
        };
        handle(args, &Config::default()).await.unwrap();

        let content = std::fs::read_to_string(&state).unwrap();
        assert!(content.contains("important"));
        assert!(content.contains("check NOTAM B"));
    }
}
