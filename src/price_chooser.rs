use crate::models::Amount;

/// Pick one canonical price from scanned amounts when no rate control
/// resolved. Pure: identical inputs always give identical output.
///
/// Priority order:
///   1. empty set: nothing to choose
///   2. nearest to the last observed price
///   3. nearest to the user's expected price
///   4. no anchor at all: the maximum, on the assumption that the largest
///      visible figure is the full price rather than a per-night teaser
///
/// `amounts` must be sorted ascending (the scanner guarantees this); ties in
/// distance resolve to the smaller amount.
pub fn choose_price(
    amounts: &[Amount],
    last_price: Option<Amount>,
    expected: Option<Amount>,
) -> Option<Amount> {
    if amounts.is_empty() {
        return None;
    }
    if let Some(anchor) = last_price.or(expected) {
        return nearest_to(amounts, anchor);
    }
    amounts.iter().copied().max()
}

fn nearest_to(amounts: &[Amount], anchor: Amount) -> Option<Amount> {
    let mut best: Option<(rust_decimal::Decimal, Amount)> = None;
    for &amount in amounts {
        let distance = amount.abs_distance(anchor);
        // strict comparison keeps the first (smallest) amount on ties
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, amount));
        }
    }
    best.map(|(_, amount)| amount)
}
