use super::*;
use crate::animation::kind::AnimationKind;

#[test]
fn constructors_merge_variant_defaults() {
    let img = Element::image("https://cdn.example/cat.png");
    assert!(img.flags().keep_ratio);
    assert_eq!(img.variant(), ElementVariant::Image);
    assert_eq!(img.geometry().opacity, 1.0);
    assert_eq!(img.geometry().width, None);

    let emoji = Element::emoji("🎉");
    assert_eq!(emoji.geometry().width, Some(64.0));
    assert_eq!(emoji.kind().intrinsic_ratio(), Some(1.0));

    let shape = Element::shape(ShapeKind::Ellipse);
    assert!(!shape.flags().keep_ratio);
    assert_eq!(shape.geometry().height, Some(100.0));

    let text = Element::text("hi");
    match text.kind() {
        ElementKind::Text(t) => {
            assert_eq!(t.font_size, 48.0);
            assert_eq!(t.text_style.font_weight, 400);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn ids_are_generated_and_distinct() {
    let a = Element::text("a");
    let b = Element::text("a");
    assert_ne!(a.id(), b.id());
    assert!(!a.id().as_str().is_empty());
    assert!(Element::group().with_id("  ").is_err());
}

#[test]
fn setters_reject_non_finite_and_out_of_range() {
    let mut e = Element::text("x");
    assert!(e.set_x(f64::NAN).is_err());
    assert!(e.set_rotation(f64::INFINITY).is_err());
    assert!(e.set_opacity(1.01).is_err());
    assert!(e.set_scale(-0.5).is_err());
    assert!(e.set_width(Some(-3.0)).is_err());
    assert!(e.set_start_time(-1.0).is_err());
    assert!(e.set_duration(Some(0.0)).is_err());
    assert_eq!(e.geometry(), &Geometry::default());

    e.set_position(3.0, 4.0).unwrap();
    e.set_opacity(0.5).unwrap();
    assert_eq!(e.geometry().x, 3.0);
    assert_eq!(e.geometry().opacity, 0.5);
}

#[test]
fn set_size_honors_keep_ratio() {
    let mut shape = Element::shape(ShapeKind::Rectangle);
    shape.set_keep_ratio(true);
    assert!(shape.set_size(Some(10.0), None).is_err());
    assert!(shape.set_size(Some(10.0), Some(20.0)).is_ok());

    let mut img = Element::image("a.png");
    if let ElementKind::Image(p) = img.kind_mut() {
        p.intrinsic_size = Some(Size::new(800.0, 400.0).unwrap());
    }
    img.set_size(Some(200.0), None).unwrap();
    assert_eq!(img.resolved_size().unwrap(), (Some(200.0), Some(100.0)));
}

#[test]
fn add_animation_rejects_bad_range_before_append() {
    let mut e = Element::text("x");
    let err = e.add_animation(Animation::fade_in(2.0, 1.0)).unwrap_err();
    assert!(matches!(err, StageError::InvalidRange { .. }));
    assert!(e.animations().is_empty());
}

#[test]
fn add_animation_rejects_same_instance_twice() {
    let mut e = Element::text("x");
    let a = Animation::fade_in(0.0, 1.0);
    e.add_animation(a.clone()).unwrap();
    let err = e.add_animation(a.clone()).unwrap_err();
    assert!(matches!(err, StageError::DuplicateAnimation { .. }));
    e.add_animation(a.duplicate()).unwrap();
    assert_eq!(e.animations().len(), 2);

    let removed = e.remove_animation(&a.id).unwrap();
    assert_eq!(removed.kind, AnimationKind::FadeIn);
    assert_eq!(e.animations().len(), 1);
}

#[test]
fn validate_checks_payloads() {
    let mut v = Element::video("clip.mp4");
    if let ElementKind::Video(p) = v.kind_mut() {
        p.volume = 2.0;
    }
    assert_eq!(v.validate().unwrap_err().path(), Some("$.volume"));

    let mut t = Element::text("x");
    if let ElementKind::Text(p) = t.kind_mut() {
        p.color = "red".to_owned();
    }
    assert_eq!(t.validate().unwrap_err().path(), Some("$.color"));

    let mut w = Element::widget("acme", "counter");
    if let ElementKind::Widget(p) = w.kind_mut() {
        p.appear = Some(WidgetPhase::new(-1.0));
    }
    assert_eq!(w.validate().unwrap_err().path(), Some("$.appear.duration"));

    assert!(Element::widget("", "counter").validate().is_err());
    assert!(Element::image(" ").validate().is_err());
    assert!(Element::emoji("🙂").validate().is_ok());
}
