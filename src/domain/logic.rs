// src/domain/logic.rs

/// Marker and price cutoff for spotting rental ads mislabeled as sales. A
/// sale listing whose description mentions rent and whose asking price is
/// implausibly small is a monthly-rent figure, not a sale price.
pub const RENT_MARKER: &str = " rent ";
pub const RENT_PRICE_CUTOFF: f64 = 20.0;

/// True when a listing reads like a rental ad: the free-text description
/// carries the rent marker and the decoded price is below the cutoff.
pub fn looks_like_rental(description: Option<&str>, price: f64) -> bool {
    let mentions_rent = description
        .map(|d| d.contains(RENT_MARKER))
        .unwrap_or(false);
    mentions_rent && price < RENT_PRICE_CUTOFF
}
