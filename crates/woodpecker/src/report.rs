//! Plain-text rendering of the view for the console.

use std::fmt::Write;

use woodpecker_engine::ViewState;
use woodpecker_types::{Checkpoint, Leaf, WitnessedCheckpoint};

/// Longest leaf preview shown in a summary line.
const PREVIEW_LEN: usize = 60;

/// One-line summary of the view, printed on every change.
pub fn summary(state: &ViewState) -> String {
    let mut out = format!("[{}]", state.selected.as_deref().unwrap_or("-"));

    match &state.checkpoint {
        Some(cp) => {
            let _ = write!(out, " size={}", cp.size);
        }
        None => out.push_str(" size=?"),
    }

    match &state.witnessed {
        Some(w) => {
            let _ = write!(
                out,
                " witnessed={} ({}/{})",
                w.size(),
                w.witness_count(),
                state.witness_threshold
            );
        }
        None => {
            let _ = write!(out, " witnessed=none (need {})", state.witness_threshold);
        }
    }

    if let Some(cp) = &state.checkpoint
        && cp.contains(state.leaf.index)
    {
        let _ = write!(out, " leaf#{}: {}", state.leaf.index, preview(&state.leaf));
    }

    if let Some(err) = &state.error {
        let _ = write!(out, " error: {err}");
    }
    out
}

/// First line of a leaf, shortened for a one-line display.
fn preview(leaf: &Leaf) -> String {
    let text = String::from_utf8_lossy(&leaf.contents);
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > PREVIEW_LEN {
        let cut: String = line.chars().take(PREVIEW_LEN).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

/// Multi-line description of a checkpoint and its witnessed counterpart.
pub fn checkpoint(
    cp: &Checkpoint,
    witnessed: Option<&WitnessedCheckpoint>,
    threshold: usize,
) -> String {
    let mut out = String::from_utf8_lossy(&cp.raw).into_owned();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');

    match witnessed {
        Some(w) => {
            let _ = writeln!(
                out,
                "witnessed size {} by {} of {} required: {}",
                w.size(),
                w.witness_count(),
                threshold,
                w.witnesses.join(", ")
            );
            if w.size() < cp.size {
                let _ = writeln!(
                    out,
                    "log is {} leaves ahead of its witnesses",
                    cp.size - w.size()
                );
            } else if w.size() > cp.size {
                let _ = writeln!(
                    out,
                    "witnesses have seen {} more leaves than the log served",
                    w.size() - cp.size
                );
            }
        }
        None => {
            let _ = writeln!(out, "no checkpoint with {threshold} witness cosignatures");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn cp(size: u64) -> Checkpoint {
        Checkpoint {
            origin: "example.com/log".into(),
            size,
            hash: vec![0; 32],
            extensions: Vec::new(),
            raw: Bytes::from(format!(
                "example.com/log\n{size}\nAAAA\n\n\u{2014} example.com/log AAAA\n"
            )),
            signatures: Vec::new(),
        }
    }

    fn witnessed(size: u64, names: &[&str]) -> WitnessedCheckpoint {
        WitnessedCheckpoint {
            checkpoint: cp(size),
            witnesses: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_summary_of_empty_view() {
        let state = ViewState {
            witness_threshold: 2,
            ..ViewState::default()
        };
        assert_eq!(summary(&state), "[-] size=? witnessed=none (need 2)");
    }

    #[test]
    fn test_summary_with_leaf_and_witnesses() {
        let state = ViewState {
            selected: Some("example.com/log".into()),
            checkpoint: Some(cp(10)),
            witnessed: Some(witnessed(9, &["w1", "w2"])),
            leaf: Leaf::new("first line\nsecond line\n", 9),
            error: None,
            witness_threshold: 2,
        };
        assert_eq!(
            summary(&state),
            "[example.com/log] size=10 witnessed=9 (2/2) leaf#9: first line"
        );
    }

    #[test]
    fn test_summary_truncates_long_leaf() {
        let state = ViewState {
            checkpoint: Some(cp(1)),
            leaf: Leaf::new("x".repeat(200), 0),
            witness_threshold: 2,
            ..ViewState::default()
        };
        let line = summary(&state);
        assert!(line.ends_with(&format!("{}...", "x".repeat(PREVIEW_LEN))), "{line}");
    }

    #[test]
    fn test_summary_shows_error() {
        let state = ViewState {
            checkpoint: Some(cp(3)),
            error: Some(std::sync::Arc::new(
                woodpecker_engine::ControllerError::UnknownLog("nope".into()),
            )),
            witness_threshold: 3,
            ..ViewState::default()
        };
        let line = summary(&state);
        assert!(line.ends_with("error: unknown log \"nope\""), "{line}");
    }

    #[test]
    fn test_checkpoint_report_notes_witness_lag() {
        let text = checkpoint(&cp(12), Some(&witnessed(10, &["w1", "w2"])), 2);
        assert!(text.starts_with("example.com/log\n12\n"));
        assert!(text.contains("witnessed size 10 by 2 of 2 required: w1, w2"));
        assert!(text.contains("log is 2 leaves ahead of its witnesses"));
    }

    #[test]
    fn test_checkpoint_report_without_quorum() {
        let text = checkpoint(&cp(12), None, 3);
        assert!(text.ends_with("no checkpoint with 3 witness cosignatures\n"));
    }
}
