//! Response Parser — turns a raw completion into a `ParsedResponse`.
//!
//! Tolerant by construction: malformed blocks are dropped, never reported as errors.
//!
//! Rules:
//! 1. A block is well-formed when its close tag appears before the next open tag
//!    (of any kind) or the end of text. Blocks do not nest.
//! 2. An unterminated block is removed from the text from its open tag up to the
//!    next open tag, or to the end of text. It yields no record.
//! 3. Records keep whatever labels were recognized, as long as the primary label
//!    (Nombre / Título) is present. Otherwise the block is dropped.
//! 4. A publish-event block wins: artists and bolos from the same reply are dropped
//!    and only the first publish-event block is kept.
//! 5. Stray close tags are removed from the text.

use tracing::debug;

use crate::assistant::models::{ArtistRecommendation, BoloOpportunity, EventDraft, ParsedResponse};
use crate::assistant::protocol::{BlockFields, BlockKind};

struct ScannedBlock<'a> {
    kind: BlockKind,
    body: &'a str,
}

struct Scan<'a> {
    blocks: Vec<ScannedBlock<'a>>,
    residual: String,
    removed_any: bool,
}

/// Parses raw model output into display text plus typed records.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let scan = scan_blocks(raw);

    let text = if scan.removed_any {
        collapse_blank_lines(&scan.residual)
    } else {
        raw.trim().to_string()
    };

    let mut artists = Vec::new();
    let mut bolos = Vec::new();
    let mut events = Vec::new();

    for block in scan.blocks {
        let fields = BlockFields::parse(block.kind, block.body);
        let kept = match block.kind {
            BlockKind::Artist => ArtistRecommendation::from_fields(fields)
                .map(|a| artists.push(a))
                .is_some(),
            BlockKind::Bolo => BoloOpportunity::from_fields(fields)
                .map(|b| bolos.push(b))
                .is_some(),
            BlockKind::PublishEvent => EventDraft::from_fields(fields)
                .map(|e| events.push(e))
                .is_some(),
        };
        if !kept {
            debug!(
                "Dropping {} block without '{}'",
                block.kind.open_tag(),
                block.kind.primary_label()
            );
        }
    }

    let mut events = events.into_iter();
    let publish_event = events.next();

    if publish_event.is_some() {
        let extra_events = events.count();
        if !artists.is_empty() || !bolos.is_empty() || extra_events > 0 {
            debug!(
                "Publish-event handoff takes precedence: dropping {} artists, {} bolos, {} extra events",
                artists.len(),
                bolos.len(),
                extra_events
            );
        }
        artists.clear();
        bolos.clear();
    }

    ParsedResponse {
        text,
        artists,
        bolos,
        publish_event,
    }
}

fn scan_blocks(raw: &str) -> Scan<'_> {
    // ASCII lowercasing keeps byte offsets aligned with `raw`.
    let lower = raw.to_ascii_lowercase();
    let mut blocks = Vec::new();
    let mut residual = String::with_capacity(raw.len());
    let mut removed_any = false;
    let mut cursor = 0;

    while let Some((start, kind)) = find_open_tag(&lower, cursor) {
        residual.push_str(&raw[cursor..start]);
        removed_any = true;

        let body_start = start + kind.open_tag().len();
        let next_open = find_open_tag(&lower, body_start).map(|(pos, _)| pos);
        let close = lower[body_start..]
            .find(&kind.close_tag().to_ascii_lowercase())
            .map(|offset| body_start + offset);

        match close {
            Some(end) if next_open.map_or(true, |next| end < next) => {
                blocks.push(ScannedBlock {
                    kind,
                    body: &raw[body_start..end],
                });
                cursor = end + kind.close_tag().len();
            }
            _ => {
                debug!("Discarding unterminated {} block", kind.open_tag());
                cursor = next_open.unwrap_or(raw.len());
            }
        }
    }
    residual.push_str(&raw[cursor..]);

    for kind in BlockKind::ALL {
        if let Some(stripped) = remove_ignore_ascii_case(&residual, kind.close_tag()) {
            debug!("Removing stray {} tag", kind.close_tag());
            residual = stripped;
            removed_any = true;
        }
    }

    Scan {
        blocks,
        residual,
        removed_any,
    }
}

/// Earliest open tag of any kind at or after `from`.
fn find_open_tag(lower: &str, from: usize) -> Option<(usize, BlockKind)> {
    BlockKind::ALL
        .iter()
        .filter_map(|&kind| {
            lower[from..]
                .find(&kind.open_tag().to_ascii_lowercase())
                .map(|offset| (from + offset, kind))
        })
        .min_by_key(|(pos, _)| *pos)
}

/// Removes every occurrence of an ASCII `needle`. `None` when there was nothing to remove.
fn remove_ignore_ascii_case(text: &str, needle: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    if !lower.contains(&needle) {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(offset) = lower[cursor..].find(&needle) {
        let pos = cursor + offset;
        out.push_str(&text[cursor..pos]);
        cursor = pos + needle.len();
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

/// Trims trailing whitespace per line and keeps at most one blank line in a row.
fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }

    lines.join("\n").trim().to_string()
}
