use fevalues::fe_values::UpdateFlags;

#[test]
fn flags_combine_with_bitor() {
    let mut flags = UpdateFlags::VALUES | UpdateFlags::JACOBIANS;
    assert!(flags.contains(UpdateFlags::VALUES));
    assert!(!flags.contains(UpdateFlags::VALUES | UpdateFlags::GRADIENTS));
    assert!(flags.intersects(UpdateFlags::VALUES | UpdateFlags::GRADIENTS));

    flags |= UpdateFlags::GRADIENTS;
    assert!(flags.contains(UpdateFlags::VALUES | UpdateFlags::GRADIENTS));
    assert_eq!(flags & UpdateFlags::GRADIENTS, UpdateFlags::GRADIENTS);
}

#[test]
fn empty_and_all() {
    assert!(UpdateFlags::empty().is_empty());
    assert_eq!(UpdateFlags::default(), UpdateFlags::empty());
    let all = UpdateFlags::all();
    for flag in [
        UpdateFlags::VALUES,
        UpdateFlags::GRADIENTS,
        UpdateFlags::QUADRATURE_POINTS,
        UpdateFlags::ANSATZ_POINTS,
        UpdateFlags::JACOBIANS,
        UpdateFlags::JXW_VALUES,
        UpdateFlags::NORMAL_VECTORS,
    ] {
        assert!(all.contains(flag));
        assert!(!UpdateFlags::empty().intersects(flag));
    }
}

#[test]
fn from_bits_rejects_unknown_bits() {
    assert_eq!(UpdateFlags::from_bits(UpdateFlags::all().bits()), Some(UpdateFlags::all()));
    assert_eq!(UpdateFlags::from_bits(0), Some(UpdateFlags::empty()));
    assert_eq!(UpdateFlags::from_bits(1 << 7), None);
}

#[test]
fn debug_lists_flag_names() {
    let flags = UpdateFlags::VALUES | UpdateFlags::JXW_VALUES;
    assert_eq!(format!("{flags:?}"), "UpdateFlags(VALUES | JXW_VALUES)");
    assert_eq!(format!("{:?}", UpdateFlags::empty()), "UpdateFlags()");
}

#[test]
fn flags_serialize_to_bits() {
    let flags = UpdateFlags::GRADIENTS | UpdateFlags::JACOBIANS;
    let json = serde_json::to_string(&flags).unwrap();
    assert_eq!(json, "18");
    let deserialized: UpdateFlags = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, flags);
}
