use super::*;
use crate::animation::kind::Direction;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn phases_follow_the_range() {
    let a = Animation::fade_in(1.0, 2.0);
    assert_eq!(animation_state(&a, 0.5).phase, AnimationPhase::Pending);
    assert_eq!(animation_state(&a, 0.5).progress, 0.0);
    assert_eq!(animation_state(&a, 1.0).phase, AnimationPhase::Active);
    assert_eq!(animation_state(&a, 1.5).progress, 0.5);
    assert_eq!(animation_state(&a, 2.0).phase, AnimationPhase::Active);
    assert_eq!(animation_state(&a, 2.5).phase, AnimationPhase::Complete);
    assert_eq!(animation_state(&a, 2.5).progress, 1.0);
}

#[test]
fn zero_length_range_is_a_step() {
    let a = Animation::fade_in(1.0, 1.0);
    let base = Geometry::default();
    assert_eq!(resolve_geometry(&base, &[a.clone()], 0.999).opacity, 0.0);
    assert_eq!(resolve_geometry(&base, &[a.clone()], 1.0).opacity, 1.0);
    assert_eq!(resolve_geometry(&base, &[a], 3.0).opacity, 1.0);
}

#[test]
fn overlapping_fades_compose_multiplicatively() {
    let anims = [Animation::fade_in(0.0, 1.0), Animation::fade_in(0.5, 1.5)];
    let g = resolve_geometry(&Geometry::default(), &anims, 0.75);
    assert!(approx(g.opacity, 0.75 * 0.25));
}

#[test]
fn fade_in_then_out_settles_to_zero() {
    let anims = [Animation::fade_in(0.0, 1.0), Animation::fade_out(2.0, 3.0)];
    let base = Geometry::default();
    assert_eq!(resolve_geometry(&base, &anims, 1.5).opacity, 1.0);
    assert!(approx(resolve_geometry(&base, &anims, 2.5).opacity, 0.5));
    assert_eq!(resolve_geometry(&base, &anims, 4.0).opacity, 0.0);
}

#[test]
fn slide_in_arrives_from_its_direction() {
    let slide = Animation::new(
        AnimationKind::SlideIn {
            direction: Direction::Left,
            distance: 200.0,
        },
        0.0,
        1.0,
    )
    .with_ease(Ease::Linear);
    let base = Geometry {
        x: 50.0,
        ..Geometry::default()
    };
    assert_eq!(resolve_geometry(&base, &[slide.clone()], 0.0).x, -150.0);
    assert_eq!(resolve_geometry(&base, &[slide.clone()], 0.5).x, -50.0);
    assert_eq!(resolve_geometry(&base, &[slide], 1.0).x, 50.0);
}

#[test]
fn zoom_spin_move_and_pulse() {
    let base = Geometry::default();
    let zoom = Animation::new(AnimationKind::ZoomIn { from_scale: 0.5 }, 0.0, 1.0)
        .with_ease(Ease::Linear);
    assert!(approx(resolve_geometry(&base, &[zoom], 0.5).scale, 0.75));

    let spin = Animation::new(AnimationKind::Spin { degrees: 90.0 }, 0.0, 2.0);
    assert_eq!(resolve_geometry(&base, &[spin.clone()], 1.0).rotation, 45.0);
    assert_eq!(resolve_geometry(&base, &[spin], 5.0).rotation, 90.0);

    let mv = Animation::new(AnimationKind::Move { dx: 10.0, dy: -4.0 }, 0.0, 1.0);
    let g = resolve_geometry(&base, &[mv], 1.0);
    assert_eq!((g.x, g.y), (10.0, -4.0));

    let pulse = Animation::new(AnimationKind::Pulse { amount: 0.2 }, 0.0, 1.0);
    assert!(approx(resolve_geometry(&base, &[pulse.clone()], 0.5).scale, 1.2));
    assert!(approx(resolve_geometry(&base, &[pulse], 1.0).scale, 1.0));
}

#[test]
fn default_ease_shapes_progress() {
    let out = Animation::new(
        AnimationKind::SlideIn {
            direction: Direction::Down,
            distance: 100.0,
        },
        0.0,
        1.0,
    );
    // OutCubic at 0.5 = 0.875
    let g = resolve_geometry(&Geometry::default(), &[out], 0.5);
    assert!(approx(g.y, 100.0 * 0.125));
}

#[test]
fn resolution_is_idempotent() {
    let anims = [
        Animation::fade_in(0.0, 1.0),
        Animation::new(AnimationKind::Spin { degrees: 30.0 }, 0.2, 0.8),
    ];
    let base = Geometry::default();
    assert_eq!(
        resolve_geometry(&base, &anims, 0.4),
        resolve_geometry(&base, &anims, 0.4)
    );
}
