//! Turning a desired change of distance into weight updates
//!
//! Both engines solve for the smallest perturbation (in a norm weighted by the
//! item/bag ratio) whose first-order effect is the desired change, then apply
//! it multiplicatively through factors that stay strictly positive.

use bagdist_core::Vector;

/// Smallest multiplicative factor a single update may apply.
pub const MIN_RESCALE_FACTOR: f64 = 1e-2;

/// Denominators at or below this mean there is no usable descent direction.
const FLAT_GRADIENT: f64 = 1e-24;

/// Target after damping: `current + speed * (closest point of interval - current)`
#[inline]
pub fn damped_target(current: f64, closest: f64, speed: f64) -> f64 {
    current + speed * (closest - current)
}

/// Split a desired change `gap` (target minus current) between item and bag
/// weights.
///
/// `item_gradient` and `bag_gradient` are the first-order sensitivities of the
/// *decrease* of the distance, so the returned perturbations satisfy
/// `⟨item_gradient, δ_item⟩ + ⟨bag_gradient, δ_bag⟩ = -gap`. The ratio `r`
/// weights the two spaces by `r²` and `(1 - r)²`.
///
/// Returns `None` when both weighted gradients vanish.
pub fn split_budget(
    item_gradient: &Vector,
    bag_gradient: &Vector,
    ratio: f64,
    gap: f64,
) -> Option<(Vector, Vector)> {
    let item_share = ratio * ratio;
    let bag_share = (1.0 - ratio) * (1.0 - ratio);
    let denominator =
        item_share * item_gradient.dot(item_gradient) + bag_share * bag_gradient.dot(bag_gradient);
    if denominator <= FLAT_GRADIENT {
        return None;
    }

    let common = -gap / denominator;
    Some((
        item_gradient * (common * item_share),
        bag_gradient * (common * bag_share),
    ))
}

/// Factors `1 + max(δ, -floor)` with `floor = min(speed, 1 - MIN_RESCALE_FACTOR)`,
/// so no factor drops below `max(1 - speed, MIN_RESCALE_FACTOR)`.
pub fn rescale_factors(perturbation: &Vector, speed: f64) -> Vector {
    let floor = -speed.min(1.0 - MIN_RESCALE_FACTOR);
    Vector::new(perturbation.iter().map(|d| 1.0 + d.max(floor)).collect())
}
