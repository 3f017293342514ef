//! Reassembles chunk outcomes into one transcript.

use tingxie_core::{ChunkOutcome, Transcript, UNKNOWN_LANGUAGE};

/// Merge outcomes (already in chunk order) into a transcript.
///
/// Texts are joined with a single space; a failed chunk contributes an empty
/// string, so its position stays visible as a double space. Only successful
/// chunks contribute segments. The language is that of the last successful
/// chunk.
pub fn assemble(outcomes: &[ChunkOutcome]) -> Transcript {
    let text = outcomes
        .iter()
        .map(|o| if o.success { o.text.as_str() } else { "" })
        .collect::<Vec<_>>()
        .join(" ");

    let segments = outcomes
        .iter()
        .filter(|o| o.success)
        .flat_map(|o| o.segments.iter().cloned())
        .collect();

    let language = outcomes
        .iter()
        .rev()
        .find(|o| o.success)
        .map_or(UNKNOWN_LANGUAGE, |o| o.language.as_str())
        .to_string();

    Transcript {
        text,
        language,
        segments,
        cancelled: false,
    }
}

/// Merge outcomes tagged with their chunk index, in whatever order they
/// completed.
pub fn assemble_indexed(mut outcomes: Vec<(usize, ChunkOutcome)>, cancelled: bool) -> Transcript {
    outcomes.sort_by_key(|(index, _)| *index);
    let ordered: Vec<ChunkOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();
    Transcript {
        cancelled,
        ..assemble(&ordered)
    }
}
