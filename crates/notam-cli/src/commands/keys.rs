use anyhow::Result;
use notam_core::identity;
use std::path::Path;

use super::read_briefing;

pub fn handle(briefing: &Path, digest: bool) -> Result<()> {
    let notams = read_briefing(briefing)?;

    for notam in &notams {
        let key = identity::key(notam);
        let shown = if digest { key.digest() } else { key.to_string() };
        println!("{}  {}", shown, notam.id.as_deref().unwrap_or("-"));
    }

    let unique = identity::keys(&notams).len();
    if unique < notams.len() {
        println!(
            "\n{} notices share a key with another notice",
            notams.len() - unique
        );
    }

    Ok(())
}
