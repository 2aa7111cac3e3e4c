/// Converts a single hit into a point value.
///
/// `distance_from_center` must already be known to be inside the target
/// (`distance <= radius`), so the precision factor lands in `[0, 1]` by
/// construction. The `+ 0.01` denominator guard caps the reward for
/// implausibly instant clicks and keeps the division away from zero.
///
/// Returns the awarded points together with the precision factor, which is
/// also persisted in the click record.
pub fn score(distance_from_center: f64, target_radius: f64, reaction_secs: f64) -> (u32, f64) {
    let precision_factor = ((target_radius - distance_from_center) / target_radius).max(0.0);

    let reaction_component = (100.0 / (reaction_secs + 0.01)).floor().max(0.0) as u32;
    let precision_component = (precision_factor * 100.0).floor() as u32;

    (reaction_component + precision_component, precision_factor)
}
