//! Follow graph set difference
//!
//! Compares the followers and following username sets and produces the two
//! one-sided differences, sorted with a locale-style collation.

use crate::graph::types::{FollowGraphDiff, FollowList, Username};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Punctuation in root-collation order; all of it sorts before digits
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Differ for followers/following username sets
pub struct GraphDiffer;

impl GraphDiffer {
    /// Compute both set differences along with cardinalities and unit totals
    pub fn diff(followers: &FollowList, following: &FollowList) -> FollowGraphDiff {
        let not_following_back = sorted_difference(&following.usernames, &followers.usernames);
        let you_dont_follow_back = sorted_difference(&followers.usernames, &following.usernames);

        FollowGraphDiff {
            total_followers: followers.relationship_units,
            total_following: following.relationship_units,
            unique_followers: followers.usernames.len() as u64,
            unique_following: following.usernames.len() as u64,
            not_following_back_count: not_following_back.len() as u64,
            not_following_back,
            you_dont_follow_back_count: you_dont_follow_back.len() as u64,
            you_dont_follow_back,
        }
    }
}

/// `left − right`, collated
fn sorted_difference(left: &BTreeSet<Username>, right: &BTreeSet<Username>) -> Vec<Username> {
    let mut difference: Vec<Username> = left.difference(right).cloned().collect();
    difference.sort_by(|a, b| locale_compare(a.as_str(), b.as_str()));
    difference
}

/// Compare strings the way a root-locale collator would for handles.
///
/// Primary level: punctuation < digits < letters, letters compared without
/// case or Latin accents. Ties fall through to accents, then case (lower
/// first), then code points.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        .then_with(|| {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        })
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if c.is_alphabetic() {
        (3, fold_letter(c) as u32)
    } else if c.is_numeric() {
        (2, c.to_digit(10).unwrap_or(c as u32))
    } else {
        let rank = PUNCTUATION_ORDER
            .chars()
            .position(|p| p == c)
            .map(|index| index as u32)
            .unwrap_or(PUNCTUATION_ORDER.len() as u32 + c as u32);
        (1, rank)
    }
}

/// Lower-case and strip common Latin diacritics
fn fold_letter(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' | 'ţ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
