//! Events export to CSV, per spec §6: columns `timestamp,type,description`,
//! UTF-8, no BOM.

use std::path::Path;

use boundarycam_detect::Event;

pub fn save_events_csv(events: &[Event], output_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = String::from("timestamp,type,description\n");
    for event in events {
        out.push_str(&format!(
            "{},{},{}\n",
            event.timestamp_seconds,
            event.kind.as_str(),
            event.description()
        ));
    }
    std::fs::write(output_path, out)?;
    tracing::info!("events saved: {:?}", output_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundarycam_detect::{EventKind, ScoreState};

    #[test]
    fn writes_expected_header_and_columns() {
        let events = vec![Event {
            kind: EventKind::Four,
            timestamp_seconds: 5.0,
            score_before: ScoreState::resolved(100, 2),
            score_after: ScoreState::resolved(104, 2),
            overs_at_event: None,
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        save_events_csv(&events, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "timestamp,type,description");
        assert_eq!(lines.next().unwrap(), "5,FOUR,Score: 100/2 → 104/2");
    }
}
