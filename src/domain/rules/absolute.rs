use super::Transition;

/// Fires once the price reaches the target from below.
#[must_use]
pub fn evaluate_above(target_price: f64, price: f64) -> Transition {
    if price >= target_price {
        Transition::Retire {
            target: target_price,
        }
    } else {
        Transition::Hold
    }
}

/// Fires once the price reaches the target from above.
#[must_use]
pub fn evaluate_below(target_price: f64, price: f64) -> Transition {
    if price <= target_price {
        Transition::Retire {
            target: target_price,
        }
    } else {
        Transition::Hold
    }
}
