//! Global-shape containment tests and directional influence fields.
//!
//! Both functions are total: any finite or non-finite point, and any canvas
//! size including zero, yields a defined answer.

use glam::DVec2;

use crate::settings::{Direction, EffectPosition, GlobalShape};

/// Shape radius on the side of the canvas the direction points away from.
const OFF_SIDE_MULTIPLIER: f64 = 0.3;
/// Vertical stretch of the heart; with the shift it spans [-1, 1].
const HEART_SCALE: f64 = 1.3;
const HEART_SHIFT: f64 = 0.3;
const STAR_POINTS: f64 = 5.0;
const STAR_INNER: f64 = 0.6;
const STAR_DEPTH: f64 = 0.4;

/// Maps `point` into [-1, 1] per axis relative to the canvas center.
fn normalize_centered(point: DVec2, canvas: DVec2) -> DVec2 {
    let half = (canvas * 0.5).max(DVec2::splat(f64::MIN_POSITIVE));
    (point - canvas * 0.5) / half
}

/// Soft asymmetric mask: full radius on the side `direction` names,
/// [`OFF_SIDE_MULTIPLIER`] of it on the opposite side.
pub fn direction_multiplier(normalized: DVec2, direction: Direction) -> f64 {
    let on_side = match direction {
        Direction::Top => normalized.y <= 0.0,
        Direction::Bottom => normalized.y >= 0.0,
        Direction::Left => normalized.x <= 0.0,
        Direction::Right => normalized.x >= 0.0,
        Direction::Center | Direction::Radial => true,
    };
    if on_side {
        1.0
    } else {
        OFF_SIDE_MULTIPLIER
    }
}

/// Whether `point` lies inside the global silhouette.
///
/// `canvas` is the canvas size; the silhouette is centered on it and spans it.
pub fn in_global_shape(
    point: DVec2,
    canvas: DVec2,
    shape: GlobalShape,
    direction: Direction,
) -> bool {
    if shape == GlobalShape::Custom {
        return true;
    }
    let n = normalize_centered(point, canvas);
    if !n.is_finite() {
        return false;
    }
    let m = direction_multiplier(n, direction);
    let (ax, ay) = (n.x.abs(), n.y.abs());
    match shape {
        GlobalShape::Circle => n.length() <= m,
        GlobalShape::Square => ax.max(ay) <= m,
        GlobalShape::Diamond => ax + ay <= m,
        GlobalShape::Hexagon => {
            // Flat-topped, vertices at (±1, 0) and (±0.5, ±√3/2).
            let k = 3.0_f64.sqrt() * 0.5;
            ax * k + ay * 0.5 <= m * k && ay <= m * k
        }
        // Apex at the top, base along the bottom edge.
        GlobalShape::Triangle => n.y <= m && ax <= (n.y + m) * 0.5,
        GlobalShape::Star => {
            // Angle measured so the first point faces up (screen y grows downward).
            let theta = n.y.atan2(n.x) + std::f64::consts::FRAC_PI_2;
            let radius = m * (STAR_INNER + STAR_DEPTH * (STAR_POINTS * theta).cos());
            n.length() <= radius
        }
        GlobalShape::Heart => {
            // Unit disc around a point lifted by sqrt|x|: two lobes, one tip.
            let up = HEART_SCALE * -n.y + HEART_SHIFT * m;
            DVec2::new(n.x, up - (m * ax).sqrt()).length() <= m
        }
        GlobalShape::Custom => true,
    }
}

/// Distance-based influence of the directional field at `point`, in [0, 1].
///
/// `point` and `effect` are normalized into [0, 1] canvas space. The field is
/// 1 at the effect position and decays with the distance travelled away from
/// it in the named direction: `left` decays towards the right, `top` decays
/// downward, `center` and `radial` decay with Euclidean distance.
pub fn directional_influence(
    point: DVec2,
    canvas: DVec2,
    direction: Direction,
    effect: EffectPosition,
) -> f64 {
    let size = canvas.max(DVec2::splat(f64::MIN_POSITIVE));
    let n = point / size;
    let e = DVec2::new(effect.x, effect.y) / 100.0;

    let distance = match direction {
        Direction::Left => (n.x - e.x).max(0.0),
        Direction::Right => (e.x - n.x).max(0.0),
        Direction::Top => (n.y - e.y).max(0.0),
        Direction::Bottom => (e.y - n.y).max(0.0),
        Direction::Center | Direction::Radial => n.distance(e),
    };

    let influence = 1.0 - distance;
    if influence.is_nan() {
        0.0
    } else {
        influence.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> DVec2 {
        DVec2::new(800.0, 600.0)
    }

    fn effect(x: f64, y: f64) -> EffectPosition {
        EffectPosition { x, y }
    }

    // ── containment ───────────────────────────────────────────────

    #[test]
    fn canvas_center_is_inside_every_shape() {
        let center = canvas() * 0.5;
        for shape in GlobalShape::ALL {
            for direction in Direction::ALL {
                assert!(
                    in_global_shape(center, canvas(), shape, direction),
                    "center outside {shape:?} / {direction:?}"
                );
            }
        }
    }

    #[test]
    fn far_points_are_outside_every_clipping_shape() {
        let far = canvas() * 0.5 + DVec2::new(2000.0, 0.0);
        for shape in GlobalShape::ALL.into_iter().filter(|s| *s != GlobalShape::Custom) {
            assert!(!in_global_shape(far, canvas(), shape, Direction::Center));
        }
    }

    #[test]
    fn custom_accepts_everything() {
        for p in [DVec2::new(-1e6, 5.0), DVec2::new(f64::NAN, 0.0)] {
            assert!(in_global_shape(p, canvas(), GlobalShape::Custom, Direction::Top));
        }
    }

    #[test]
    fn square_contains_corners_but_circle_does_not() {
        let near_corner = DVec2::new(10.0, 10.0);
        assert!(in_global_shape(
            near_corner,
            canvas(),
            GlobalShape::Square,
            Direction::Center
        ));
        assert!(!in_global_shape(
            near_corner,
            canvas(),
            GlobalShape::Circle,
            Direction::Center
        ));
    }

    #[test]
    fn diamond_excludes_points_the_square_includes() {
        // Normalized (0.7, 0.7): Chebyshev 0.7, Manhattan 1.4.
        let p = DVec2::new(400.0 + 0.7 * 400.0, 300.0 + 0.7 * 300.0);
        assert!(in_global_shape(p, canvas(), GlobalShape::Square, Direction::Center));
        assert!(!in_global_shape(p, canvas(), GlobalShape::Diamond, Direction::Center));
    }

    #[test]
    fn direction_narrows_the_opposite_half() {
        // Normalized (0, 0.5): inside the full circle, outside the 0.3 radius.
        let below = DVec2::new(400.0, 450.0);
        let above = DVec2::new(400.0, 150.0);
        assert!(in_global_shape(above, canvas(), GlobalShape::Circle, Direction::Top));
        assert!(!in_global_shape(below, canvas(), GlobalShape::Circle, Direction::Top));
        assert!(in_global_shape(below, canvas(), GlobalShape::Circle, Direction::Bottom));
    }

    #[test]
    fn triangle_apex_is_at_the_top() {
        let near_apex = DVec2::new(400.0, 300.0 - 0.9 * 300.0);
        let top_left = DVec2::new(400.0 - 0.9 * 400.0, 300.0 - 0.9 * 300.0);
        let bottom_left = DVec2::new(400.0 - 0.9 * 400.0, 300.0 + 0.95 * 300.0);
        let shape = GlobalShape::Triangle;
        assert!(in_global_shape(near_apex, canvas(), shape, Direction::Center));
        assert!(!in_global_shape(top_left, canvas(), shape, Direction::Center));
        assert!(in_global_shape(bottom_left, canvas(), shape, Direction::Center));
    }

    #[test]
    fn star_has_points_and_notches() {
        let c = DVec2::new(400.0, 300.0);
        // Upward tip reaches radius 1; straight down is a notch.
        let tip = c + DVec2::new(0.0, -0.95 * 300.0);
        let notch = c + DVec2::new(0.0, 0.5 * 300.0);
        assert!(in_global_shape(tip, canvas(), GlobalShape::Star, Direction::Center));
        assert!(!in_global_shape(notch, canvas(), GlobalShape::Star, Direction::Center));
    }

    #[test]
    fn heart_has_a_dip_at_the_top_center() {
        let c = DVec2::new(400.0, 300.0);
        let lobe = c + DVec2::new(0.45 * 400.0, -0.55 * 300.0);
        let dip = c + DVec2::new(0.0, -0.9 * 300.0);
        assert!(in_global_shape(lobe, canvas(), GlobalShape::Heart, Direction::Center));
        assert!(!in_global_shape(dip, canvas(), GlobalShape::Heart, Direction::Center));
    }

    #[test]
    fn heart_narrows_to_a_tip_at_the_bottom() {
        let c = DVec2::new(400.0, 300.0);
        let tip = c + DVec2::new(0.0, 0.9 * 300.0);
        let beside_tip = c + DVec2::new(0.5 * 400.0, 0.8 * 300.0);
        assert!(in_global_shape(tip, canvas(), GlobalShape::Heart, Direction::Center));
        assert!(!in_global_shape(beside_tip, canvas(), GlobalShape::Heart, Direction::Center));
    }

    #[test]
    fn heart_is_a_shifted_disc_along_the_axis() {
        // On x = 0 the lift vanishes: inside iff |1.3 * up + 0.3| <= 1.
        let c = DVec2::new(400.0, 300.0);
        let inside = c + DVec2::new(0.0, -0.5 * 300.0);
        let outside = c + DVec2::new(0.0, -0.6 * 300.0);
        assert!(in_global_shape(inside, canvas(), GlobalShape::Heart, Direction::Center));
        assert!(!in_global_shape(outside, canvas(), GlobalShape::Heart, Direction::Center));
    }

    #[test]
    fn zero_canvas_does_not_panic() {
        for shape in GlobalShape::ALL {
            let _ = in_global_shape(DVec2::new(1.0, 1.0), DVec2::ZERO, shape, Direction::Left);
        }
    }

    // ── directional influence ─────────────────────────────────────

    #[test]
    fn left_direction_peaks_at_left_edge() {
        let e = effect(0.0, 50.0);
        let left = directional_influence(DVec2::new(0.0, 300.0), canvas(), Direction::Left, e);
        let right = directional_influence(DVec2::new(800.0, 300.0), canvas(), Direction::Left, e);
        assert!((left - 1.0).abs() < 1e-12);
        assert!(right.abs() < 1e-12);
    }

    #[test]
    fn right_direction_mirrors_left() {
        let e = effect(100.0, 50.0);
        let right = directional_influence(DVec2::new(800.0, 10.0), canvas(), Direction::Right, e);
        let left = directional_influence(DVec2::new(0.0, 10.0), canvas(), Direction::Right, e);
        assert!((right - 1.0).abs() < 1e-12);
        assert!(left.abs() < 1e-12);
    }

    #[test]
    fn top_and_bottom_use_the_vertical_axis() {
        let e = effect(50.0, 0.0);
        let at_top = directional_influence(DVec2::new(700.0, 0.0), canvas(), Direction::Top, e);
        let at_mid = directional_influence(DVec2::new(700.0, 300.0), canvas(), Direction::Top, e);
        assert!((at_top - 1.0).abs() < 1e-12);
        assert!((at_mid - 0.5).abs() < 1e-12);

        let e = effect(50.0, 100.0);
        let at_bottom =
            directional_influence(DVec2::new(0.0, 600.0), canvas(), Direction::Bottom, e);
        assert!((at_bottom - 1.0).abs() < 1e-12);
    }

    #[test]
    fn center_is_one_at_effect_position() {
        let v = directional_influence(canvas() * 0.5, canvas(), Direction::Center, effect(50.0, 50.0));
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn radial_matches_center() {
        // Normalized distance 0.5 from the middle of the canvas.
        let e = effect(50.0, 50.0);
        let p = DVec2::new(400.0, 600.0);
        let radial = directional_influence(p, canvas(), Direction::Radial, e);
        let center = directional_influence(p, canvas(), Direction::Center, e);
        assert!((radial - 0.5).abs() < 1e-12, "radial {radial}");
        assert_eq!(radial, center);
    }

    #[test]
    fn off_canvas_effect_position_is_allowed() {
        let v = directional_influence(
            DVec2::new(0.0, 0.0),
            canvas(),
            Direction::Left,
            effect(-100.0, 50.0),
        );
        assert_eq!(v, 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_direction() -> impl Strategy<Value = Direction> {
            prop::sample::select(Direction::ALL.to_vec())
        }

        fn any_shape() -> impl Strategy<Value = GlobalShape> {
            prop::sample::select(GlobalShape::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn influence_is_always_in_unit_interval(
                x in -2000.0_f64..2000.0,
                y in -2000.0_f64..2000.0,
                ex in -100.0_f64..200.0,
                ey in -100.0_f64..200.0,
                w in 0.0_f64..4000.0,
                h in 0.0_f64..4000.0,
                direction in any_direction(),
            ) {
                let v = directional_influence(
                    DVec2::new(x, y),
                    DVec2::new(w, h),
                    direction,
                    EffectPosition { x: ex, y: ey },
                );
                prop_assert!((0.0..=1.0).contains(&v), "influence {v}");
            }

            #[test]
            fn circle_never_contains_points_beyond_max_dimension(
                w in 1.0_f64..4000.0,
                h in 1.0_f64..4000.0,
                angle in 0.0_f64..std::f64::consts::TAU,
                extra in 1.0_f64..1000.0,
                direction in any_direction(),
            ) {
                let r = w.max(h) + extra;
                let p = DVec2::new(w, h) * 0.5 + DVec2::from_angle(angle) * r;
                prop_assert!(!in_global_shape(p, DVec2::new(w, h), GlobalShape::Circle, direction));
            }

            #[test]
            fn center_always_contained(
                w in 1.0_f64..4000.0,
                h in 1.0_f64..4000.0,
                shape in any_shape(),
                direction in any_direction(),
            ) {
                let size = DVec2::new(w, h);
                prop_assert!(in_global_shape(size * 0.5, size, shape, direction));
            }
        }
    }
}
