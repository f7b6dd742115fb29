//! Pairwise similarity scoring: fingerprint distance blended with a weak
//! filename signal.

use crate::domain::ImageEntry;
use crate::error::Result;

/// Composite weights. Visual similarity dominates; filename text is a
/// weak secondary signal. Fixed configuration, not derived.
pub const HASH_WEIGHT: f64 = 0.85;
pub const NAME_WEIGHT: f64 = 0.15;

/// Sequence-number windows for the capture-device burst bonus: full bonus
/// for near-adjacent frames, half bonus for the same short series.
const BURST_FULL_WINDOW: i64 = 3;
const BURST_PARTIAL_WINDOW: i64 = 10;
const BURST_PARTIAL_BONUS: f64 = 0.5;

/// Edit-distance fallback is scaled down: textual resemblance alone says
/// little about visual content.
const TEXT_FALLBACK_SCALE: f64 = 0.5;

/// Prefix tokens of common capture-device naming schemes (IMG_0042,
/// DSC01234, P1050012, ...).
const CAPTURE_PREFIXES: &[&str] = &[
    "img", "dsc", "dscn", "dscf", "dcim", "pict", "photo", "image", "pxl", "p",
];

/// Score one unordered pair of fingerprinted images into [0, 1].
/// Deterministic and symmetric in (a, b). Fails only on fingerprints of
/// differing length, which is an invariant violation within one session.
pub fn similarity(a: &ImageEntry, b: &ImageEntry) -> Result<f64> {
    let distance = a.fingerprint.hamming_distance(&b.fingerprint)?;
    let hash_similarity = 1.0 - f64::from(distance) / a.fingerprint.bits() as f64;
    let name_similarity = filename_similarity(&a.filename, &b.filename);
    Ok(hash_similarity * HASH_WEIGHT + name_similarity * NAME_WEIGHT)
}

/// Filename similarity in [0, 1] over normalized names.
///
/// Identical normalized names score 1.0. Two names from the same
/// capture-device series ("img 0042" / "img 0044") score by how close
/// their sequence numbers are. Everything else falls back to a scaled
/// Levenshtein ratio.
fn filename_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);

    if a == b {
        return 1.0;
    }

    if let (Some((prefix_a, seq_a)), Some((prefix_b, seq_b))) =
        (capture_sequence(&a), capture_sequence(&b))
    {
        if prefix_a == prefix_b {
            let delta = (seq_a - seq_b).abs();
            return if delta <= BURST_FULL_WINDOW {
                1.0
            } else if delta <= BURST_PARTIAL_WINDOW {
                BURST_PARTIAL_BONUS
            } else {
                0.0
            };
        }
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let ratio = 1.0 - levenshtein(&a, &b) as f64 / max_len as f64;
    ratio * TEXT_FALLBACK_SCALE
}

/// Strip the extension, lower-case, collapse separator runs (`-_. ` and
/// whitespace) into single spaces.
fn normalize_name(name: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
        _ => name,
    };

    let mut out = String::with_capacity(stem.len());
    let mut pending_space = false;
    for ch in stem.chars() {
        if matches!(ch, '-' | '_' | '.') || ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Parse a normalized name of the form `<prefix><digits>` or
/// `<prefix> <digits>` where the prefix is a known capture-device token.
/// Returns the prefix and the sequence number.
fn capture_sequence(name: &str) -> Option<(&str, i64)> {
    let (prefix, digits) = match name.split_once(' ') {
        Some((prefix, digits)) => (prefix, digits),
        None => {
            let split = name.find(|c: char| c.is_ascii_digit())?;
            name.split_at(split)
        }
    };

    if prefix.is_empty()
        || digits.is_empty()
        || !prefix.chars().all(|c| c.is_ascii_alphabetic())
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    if !CAPTURE_PREFIXES.contains(&prefix) {
        return None;
    }
    let seq = digits.parse::<i64>().ok()?;
    Some((prefix, seq))
}

/// Classic two-row Levenshtein distance over characters.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}
