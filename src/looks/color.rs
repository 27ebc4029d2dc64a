//! Color Strategy Tables
//! Mission: Classify catalog colors into neutral / warm / cool territory
//!
//! The tables are deliberately constants, not configuration: every color
//! strategy cluster and the accessory palette rule read from the same
//! source of truth.

use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    static ref NEUTRALS: HashSet<&'static str> = [
        "black", "white", "gray", "grey", "navy", "beige", "cream", "brown", "tan",
    ]
    .into_iter()
    .collect();
    static ref WARM: HashSet<&'static str> =
        ["red", "orange", "yellow", "brown", "beige"].into_iter().collect();
    static ref COOL: HashSet<&'static str> =
        ["blue", "navy", "green", "teal", "purple"].into_iter().collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueFamily {
    Warm,
    Cool,
}

pub fn is_neutral(color: &str) -> bool {
    !color.is_empty() && NEUTRALS.contains(color.to_ascii_lowercase().as_str())
}

pub fn hue_family(color: &str) -> Option<HueFamily> {
    let lower = color.to_ascii_lowercase();
    if WARM.contains(lower.as_str()) {
        Some(HueFamily::Warm)
    } else if COOL.contains(lower.as_str()) {
        Some(HueFamily::Cool)
    } else {
        None
    }
}

/// Case-insensitive equality of two non-empty colors.
pub fn same_color(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Same hue family (warm with warm, cool with cool).
pub fn is_tonal(color: &str, anchor_color: &str) -> bool {
    match (hue_family(color), hue_family(anchor_color)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Accent pairs are cross-family: warm against cool.
pub fn is_accent_pair(color: &str, anchor_color: &str) -> bool {
    match (hue_family(color), hue_family(anchor_color)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}
