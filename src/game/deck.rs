//! Deck Generation
//!
//! Deals every face value twice in a uniformly shuffled order.

use crate::core::rng::DeterministicRng;
use crate::game::state::Card;

/// Default face values: eight pairs.
pub const DEFAULT_CARD_VALUES: [&str; 8] = ["🐱", "🐶", "🐵", "🐸", "🐼", "🦊", "🐧", "🐙"];

/// Default alphabet as owned strings.
pub fn default_card_values() -> Vec<String> {
    DEFAULT_CARD_VALUES.iter().map(|v| v.to_string()).collect()
}

/// Build a shuffled deck holding each value exactly twice.
///
/// Card ids are assigned after shuffling, so `cards[i].id == i`.
pub fn build_deck(values: &[String], rng: &mut DeterministicRng) -> Vec<Card> {
    let mut faces: Vec<&str> = values
        .iter()
        .chain(values.iter())
        .map(String::as_str)
        .collect();
    rng.shuffle(&mut faces);

    faces
        .into_iter()
        .enumerate()
        .map(|(index, value)| Card::new(index as u32, value))
        .collect()
}
