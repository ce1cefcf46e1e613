use crate::script::model::{DialogueTurn, TimedTurn};

/// Place `turns` on an absolute timeline.
///
/// `duration_lookup(i)` reports the measured audio length of turn `i`; `None` means the audio is
/// unknown and the turn becomes zero-length. Consecutive turns are always separated by
/// `gap_ms`, so `start[i] == sum(d[0..i]) + i * gap_ms`. The input turns are copied, never
/// mutated.
#[tracing::instrument(skip(turns, duration_lookup), fields(turns = turns.len()))]
pub fn build_timeline<F>(turns: &[DialogueTurn], duration_lookup: F, gap_ms: u64) -> Vec<TimedTurn>
where
    F: Fn(usize) -> Option<u64>,
{
    let mut cursor = 0u64;
    let mut timed = Vec::with_capacity(turns.len());

    for (idx, turn) in turns.iter().enumerate() {
        let duration_ms = match duration_lookup(idx) {
            Some(d) => d,
            None => {
                tracing::warn!(
                    turn = idx + 1,
                    speaker = turn.speaker.as_str(),
                    "audio duration unknown; using a zero-length turn"
                );
                0
            }
        };

        let start_time_ms = cursor;
        let end_time_ms = start_time_ms + duration_ms;
        tracing::debug!(
            turn = idx + 1,
            speaker = turn.speaker.as_str(),
            duration_ms,
            start_time_ms,
            "timed turn"
        );

        timed.push(TimedTurn {
            turn: turn.clone(),
            duration_ms,
            start_time_ms,
            end_time_ms,
        });
        cursor = end_time_ms + gap_ms;
    }

    timed
}

#[cfg(test)]
#[path = "../../tests/unit/script/timeline.rs"]
mod tests;
