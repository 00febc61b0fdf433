/// Rating value for words outside the known table
pub const UNRECOGNIZED_RATING: u8 = 0;

/// Maps a star-rating class word to its numeric rating
///
/// The five words are matched with the spelling the catalog uses for its
/// CSS classes ("One" through "Five"). Any other word maps to
/// [`UNRECOGNIZED_RATING`].
pub fn map_rating(word: &str) -> u8 {
    match word.trim() {
        "One" => 1,
        "Two" => 2,
        "Three" => 3,
        "Four" => 4,
        "Five" => 5,
        _ => UNRECOGNIZED_RATING,
    }
}
