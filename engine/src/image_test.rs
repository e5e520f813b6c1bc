use super::*;

/// 2x2 image: red, green / blue, white.
fn checker() -> Vec<u8> {
    vec![
        255, 0, 0, 255, 0, 255, 0, 255, //
        0, 0, 255, 255, 255, 255, 255, 255,
    ]
}

fn store_with_checker() -> ImageStore {
    let mut store = ImageStore::default();
    store.store(1, &checker(), 2, 2).expect("store");
    store
}

// =============================================================
// Registry
// =============================================================

#[test]
fn store_rejects_zero_size_and_short_buffers() {
    let mut store = ImageStore::default();
    assert!(matches!(store.store(1, &[], 0, 4), Err(EngineError::InvalidArgument(_))));
    assert!(store.store(1, &[0; 15], 2, 2).is_err());
    assert!(store.is_empty());
}

#[test]
fn store_truncates_long_buffers() {
    let mut store = ImageStore::default();
    store.store(1, &[7; 20], 2, 2).expect("store");
    assert_eq!(store.get(1).expect("image").rgba.len(), 16);
}

#[test]
fn resize_mode_from_u32() {
    assert_eq!(ResizeMode::try_from(0), Ok(ResizeMode::Nearest));
    assert_eq!(ResizeMode::try_from(1), Ok(ResizeMode::Bilinear));
    assert!(ResizeMode::try_from(2).is_err());
}

#[test]
fn resize_unknown_image_is_invalid() {
    let store = ImageStore::default();
    assert!(store.resize(5, 4, 4, ResizeMode::Nearest).is_err());
}

// =============================================================
// Resampling
// =============================================================

#[test]
fn nearest_upscale_duplicates_pixels() {
    let out = store_with_checker().resize(1, 4, 4, ResizeMode::Nearest).expect("resize");
    assert_eq!(out.len(), 4 * 4 * 4);
    assert_eq!(&out[0..4], &[255, 0, 0, 255]);
    assert_eq!(&out[4..8], &[255, 0, 0, 255]);
    assert_eq!(&out[8..12], &[0, 255, 0, 255]);
    // Bottom-right output pixel samples the white source pixel.
    assert_eq!(&out[60..64], &[255, 255, 255, 255]);
}

#[test]
fn output_size_floors_at_one() {
    let out = store_with_checker().resize(1, 0, 0, ResizeMode::Bilinear).expect("resize");
    assert_eq!(out, vec![255, 0, 0, 255]);
}

#[test]
fn bilinear_blends_between_neighbours() {
    let out = store_with_checker().resize(1, 4, 1, ResizeMode::Bilinear).expect("resize");
    assert_eq!(out.len(), 16);
    assert_eq!(&out[0..4], &[255, 0, 0, 255]);
    // x = 1 samples gx = 0.5 on the top row: halfway between red and green.
    assert_eq!(&out[4..8], &[128, 128, 0, 255]);
    // Past the last column the right neighbour clamps to the edge.
    assert_eq!(&out[12..16], &[0, 255, 0, 255]);
}

#[test]
fn same_size_bilinear_is_identity() {
    let out = store_with_checker().resize(1, 2, 2, ResizeMode::Bilinear).expect("resize");
    assert_eq!(out, checker());
}
