use super::*;

fn registry_with(names: &[&str]) -> (AxisRegistry, Vec<AxisId>) {
    let mut reg = AxisRegistry::new();
    let ids = names.iter().map(|n| reg.create(*n, None)).collect();
    (reg, ids)
}

#[test]
fn test_axes_rejects_duplicates() {
    let (_, ids) = registry_with(&["C", "N"]);
    assert!(Axes::new(&[ids[0], ids[1]]).is_ok());
    assert_eq!(Axes::new(&[ids[0], ids[1], ids[0]]), Err(ids[0]));
}

#[test]
fn test_set_algebra_preserves_order() {
    let (_, ids) = registry_with(&["A", "B", "C", "D"]);
    let ab = Axes::new(&[ids[0], ids[1]]).unwrap();
    let bcd = Axes::new(&[ids[1], ids[2], ids[3]]).unwrap();

    assert_eq!(ab.union(&bcd).as_slice(), &[ids[0], ids[1], ids[2], ids[3]]);
    assert_eq!(ab.intersection(&bcd).as_slice(), &[ids[1]]);
    assert_eq!(bcd.difference(&ab).as_slice(), &[ids[2], ids[3]]);
    assert_eq!(
        ab.symmetric_difference(&bcd).as_slice(),
        &[ids[0], ids[2], ids[3]]
    );
    assert!(Axes::new(&[ids[1]]).unwrap().is_subset(&ab));
    assert!(Axes::new(&[ids[1], ids[0]]).unwrap().same_set(&ab));
    assert!(!bcd.same_set(&ab));
}

#[test]
fn test_length_binding_is_immutable() {
    let (mut reg, ids) = registry_with(&["N"]);
    assert_eq!(reg.length(ids[0]), None);
    reg.set_length(ids[0], 32).unwrap();
    // Same length again is accepted.
    reg.set_length(ids[0], 32).unwrap();
    let err = reg.set_length(ids[0], 64).unwrap_err();
    assert_eq!(
        err,
        GeonError::AxisLengthConflict {
            axis: "N".to_string(),
            bound: 32,
            requested: 64
        }
    );
    assert_eq!(reg.length(ids[0]), Some(32));
}

#[test]
fn test_unbound_axis_reported_by_name() {
    let (mut reg, ids) = registry_with(&["C", "H"]);
    reg.set_length(ids[0], 3).unwrap();
    let axes = Axes::new(&ids).unwrap();
    match reg.lengths(&axes) {
        Err(GeonError::UnboundAxis { axis }) => assert_eq!(axis, "H"),
        other => panic!("Expected UnboundAxis, got {:?}", other),
    }
}

#[test]
fn test_create_like_makes_distinct_identity() {
    let (mut reg, ids) = registry_with(&["Y"]);
    let hidden = reg.create_like(ids[0], Some(200)).unwrap();
    assert_ne!(hidden, ids[0]);
    assert_eq!(reg.length(hidden), Some(200));
    assert_eq!(reg.info(hidden).unwrap().like, Some(ids[0]));
    assert_eq!(reg.name(hidden), "Y_1");
    let second = reg.create_like(ids[0], None).unwrap();
    assert_eq!(reg.name(second), "Y_2");
}

#[test]
fn test_sample_axes_exclude_batch() {
    let (mut reg, ids) = registry_with(&["C", "H", "N"]);
    let all = Axes::new(&ids).unwrap();
    assert_eq!(reg.sample_axes(&all), all);
    reg.set_batch_axes(&[ids[2]]);
    assert_eq!(reg.sample_axes(&all).as_slice(), &[ids[0], ids[1]]);
    assert_eq!(reg.batch_axes_of(&all).as_slice(), &[ids[2]]);
}
