use super::*;
use crate::animation::kind::Animation;

fn clip() -> Clip {
    Clip::new(Canvas::new(1280, 720).unwrap(), 10.0).unwrap()
}

#[test]
fn rejects_bad_duration() {
    let canvas = Canvas::new(10, 10).unwrap();
    assert!(Clip::new(canvas, 0.0).is_err());
    assert!(Clip::new(canvas, f64::NAN).is_err());
    let mut c = clip();
    assert!(c.set_duration(-1.0).is_err());
    assert_eq!(c.duration(), 10.0);
}

#[test]
fn authoring_round_trip() {
    let mut c = clip();
    let g = c.add(Element::group()).unwrap();
    let t = c.add_to(&g, Element::text("hello")).unwrap();
    assert_eq!(c.tree().parent(&t).unwrap(), Some(&g));

    c.modify(&t, |e| e.add_animation(Animation::fade_in(0.0, 1.0)))
        .unwrap()
        .unwrap();
    assert_eq!(c.get(&t).unwrap().animations().len(), 1);

    let err = c
        .try_modify(&t, |e| {
            e.set_x(50.0)?;
            e.add_animation(Animation::fade_in(2.0, 1.0))
        })
        .unwrap_err();
    assert!(matches!(err, StageError::InvalidRange { .. }));
    assert_eq!(c.get(&t).unwrap().animations().len(), 1);
    assert_eq!(c.get(&t).unwrap().geometry().x, 0.0);

    c.detach(&t).unwrap();
    c.attach(None, &t).unwrap();
    assert_eq!(c.tree().roots().count(), 2);

    c.remove(&g).unwrap();
    assert_eq!(c.tree().len(), 1);
}

#[test]
fn ids_stay_unique_across_nesting() {
    let mut c = clip();
    let g = c
        .add(Element::group().with_id("dup").unwrap())
        .unwrap();
    assert!(c.add_to(&g, Element::text("x").with_id("dup").unwrap()).is_err());
    assert!(c.add(Element::text("x").with_id("dup").unwrap()).is_err());
}
