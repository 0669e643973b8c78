//! moxcms Parity Tests
//!
//! moxcms parses headers independently; it must agree with our reading of
//! lcms2 profiles and accept the profiles we write.

use lcms2::{CIExyY, ToneCurve};
use moxcms::{ColorProfile, DataColorSpace};
use oxicc_core::{ColorSpace, Profile, ProfileClass, TagSignature};

fn lcms2_profiles() -> Vec<(&'static str, Vec<u8>)> {
    let d50 = CIExyY {
        x: 0.3457,
        y: 0.3585,
        Y: 1.0,
    };
    let gray = lcms2::Profile::new_gray(&d50, &ToneCurve::new(2.2))
        .expect("Gray profile creation failed");
    vec![
        ("sRGB", lcms2::Profile::new_srgb().icc().unwrap()),
        ("gray", gray.icc().unwrap()),
    ]
}

fn same_color_space(ours: Option<ColorSpace>, theirs: DataColorSpace) -> bool {
    matches!(
        (ours, theirs),
        (Some(ColorSpace::Rgb), DataColorSpace::Rgb)
            | (Some(ColorSpace::Gray), DataColorSpace::Gray)
            | (Some(ColorSpace::Xyz), DataColorSpace::Xyz)
            | (Some(ColorSpace::Lab), DataColorSpace::Lab)
            | (Some(ColorSpace::Cmyk), DataColorSpace::Cmyk)
    )
}

fn assert_header_agrees(name: &str, data: &[u8]) {
    let ours = Profile::from_bytes(data).unwrap();
    let theirs = ColorProfile::new_from_slice(data)
        .unwrap_or_else(|err| panic!("{name}: moxcms rejected the profile: {err:?}"));

    assert!(
        same_color_space(ours.color_space(), theirs.color_space),
        "{name}: color space {:?} vs {:?}",
        ours.color_space(),
        theirs.color_space
    );
    assert!(
        same_color_space(ours.pcs(), theirs.pcs),
        "{name}: PCS {:?} vs {:?}",
        ours.pcs(),
        theirs.pcs
    );
    assert_eq!(ours.profile_class(), Some(ProfileClass::Display), "{name}");
    assert_eq!(
        theirs.profile_class,
        moxcms::ProfileClass::DisplayDevice,
        "{name}"
    );
}

#[test]
fn test_header_agrees_on_lcms2_profiles() {
    for (name, data) in lcms2_profiles() {
        assert_header_agrees(name, &data);
    }
}

#[test]
fn test_moxcms_reads_rewritten_profiles() {
    for (name, data) in lcms2_profiles() {
        let mut profile = Profile::from_bytes(&data).unwrap();
        profile
            .add_text(TagSignature::DESC, &format!("{name} rewritten"))
            .unwrap();
        profile.remove_tag(TagSignature::COPYRIGHT);

        assert_header_agrees(name, &profile.to_bytes());
    }
}
