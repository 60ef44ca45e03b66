use edgematch::{
    EdgeMatchError, GradientField, ImagePyramid, ImageView, Match, MatchConfig, OwnedImage,
    ScanWindow,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        EdgeMatchError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        EdgeMatchError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        EdgeMatchError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, EdgeMatchError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn image_view_roi_matches_expected_values() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();
    assert_eq!(view.stride(), 4);
    assert_eq!(view.as_slice(), data.as_slice());

    let roi = view.roi(1, 1, 2, 2).unwrap();
    assert_eq!(roi.width(), 2);
    assert_eq!(roi.height(), 2);
    assert_eq!(roi.stride(), 4);
    assert_eq!(roi.row(0).unwrap(), &[5u8, 6u8]);
    assert_eq!(roi.row(1).unwrap(), &[9u8, 10u8]);
    assert_eq!(roi.get(0, 0).copied(), Some(5u8));
    assert!(roi.get(2, 0).is_none());

    let err = view.roi(3, 3, 2, 2).err().unwrap();
    assert_eq!(
        err,
        EdgeMatchError::RoiOutOfBounds {
            x: 3,
            y: 3,
            width: 2,
            height: 2,
            img_width: 4,
            img_height: 4,
        }
    );
}

#[test]
fn owned_image_copies_strided_views() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();
    let owned = OwnedImage::from_view(view.roi(1, 2, 3, 2).unwrap());
    assert_eq!(owned.width(), 3);
    assert_eq!(owned.height(), 2);
    assert_eq!(owned.data(), &[9u8, 10, 11, 13, 14, 15]);

    let err = OwnedImage::new(vec![0u8; 5], 2, 3).err().unwrap();
    assert_eq!(err, EdgeMatchError::BufferTooSmall { needed: 6, got: 5 });
}

#[test]
fn image_pyramid_downsamples_by_two() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();

    let pyramid = ImagePyramid::build_u8(view, 3).unwrap();
    assert_eq!(pyramid.levels().len(), 3);

    let level1 = pyramid.level(1).unwrap();
    assert_eq!(level1.width(), 2);
    assert_eq!(level1.height(), 2);
    assert_eq!(level1.row(0).unwrap(), &[4u8, 5u8]);
    assert_eq!(level1.row(1).unwrap(), &[8u8, 9u8]);

    let level2 = pyramid.level(2).unwrap();
    assert_eq!(level2.width(), 1);
    assert_eq!(level2.height(), 1);
}

#[test]
fn image_pyramid_keeps_requested_depth_for_tiny_inputs() {
    let data = [200u8; 6];
    let view = ImageView::from_slice(&data, 3, 2).unwrap();

    let pyramid = ImagePyramid::build_u8(view, 5).unwrap();
    assert_eq!(pyramid.len(), 5);
    let sizes: Vec<(usize, usize)> = pyramid
        .levels()
        .iter()
        .map(|l| (l.width(), l.height()))
        .collect();
    assert_eq!(sizes, vec![(3, 2), (2, 1), (1, 1), (1, 1), (1, 1)]);
    assert!(pyramid.levels().iter().all(|l| l.data().iter().all(|&v| v == 200)));

    assert_eq!(ImagePyramid::build_u8(view, 0).unwrap().len(), 1);
}

#[test]
fn image_pyramid_uses_ceiling_sizes() {
    let data = vec![0u8; 101 * 75];
    let view = ImageView::from_slice(&data, 101, 75).unwrap();
    let pyramid = ImagePyramid::build_u8(view, 3).unwrap();
    let sizes: Vec<(usize, usize)> = pyramid
        .levels()
        .iter()
        .map(|l| (l.width(), l.height()))
        .collect();
    assert_eq!(sizes, vec![(101, 75), (51, 38), (26, 19)]);
}

#[test]
fn gradient_field_matches_image_size_and_is_finite() {
    let mut data = vec![0u8; 7 * 5];
    data[2 * 7 + 3] = 255;
    let view = ImageView::from_slice(&data, 7, 5).unwrap();
    let field = GradientField::sobel(view);

    assert_eq!((field.width(), field.height()), (7, 5));
    assert_eq!(field.gx().len(), 35);
    assert!(field.inv_magnitude().iter().all(|v| v.is_finite()));

    // Left of the bright pixel the intensity rises towards +x.
    let left = field.at(2, 2).unwrap();
    assert!(left.gx > 0.0);
    assert_eq!(left.gy, 0.0);
    assert!((left.magnitude * left.inv_magnitude - 1.0).abs() < 1e-6);

    let far = field.at(6, 4).unwrap();
    assert_eq!(far.magnitude, 0.0);
    assert_eq!(far.inv_magnitude, 0.0);
    assert!(field.at(7, 0).is_none());
}

#[test]
fn scan_window_centered_clips_to_level() {
    let inner = ScanWindow::centered(50, 40, 20, 200, 100);
    assert_eq!(
        inner,
        ScanWindow {
            x0: 40,
            y0: 30,
            x1: 60,
            y1: 50,
        }
    );

    let corner = ScanWindow::centered(2, 3, 20, 200, 100);
    assert_eq!((corner.x0, corner.y0), (0, 0));
    assert_eq!((corner.width(), corner.height()), (12, 13));

    let edge = ScanWindow::centered(199, 99, 40, 200, 100);
    assert_eq!((edge.x1, edge.y1), (200, 100));
    assert_eq!((edge.width(), edge.height()), (21, 21));

    assert!(ScanWindow::full(0, 10).is_empty());
}

#[test]
fn match_top_left_centers_footprint() {
    let m = Match {
        x: 10,
        y: 40,
        score: 0.9,
        scale: 1.0,
        angle_deg: 0.0,
        width: 31,
        height: 20,
        level: 0,
        variant: 0,
    };
    assert_eq!(m.top_left(), (-5, 30));
}

#[test]
fn match_config_defaults_are_valid() {
    let cfg = MatchConfig::default();
    assert_eq!(cfg.min_score, 0.7);
    assert_eq!(cfg.roi_size, 40);
    assert_eq!(cfg.top_k, 5);
    assert_eq!(cfg.greediness, 0.8);
    assert_eq!(cfg.coarse_step, 4);
    assert_eq!(cfg.coarse_min_score, 0.3);
    assert_eq!(cfg.min_roi_size, 5);
    assert!(cfg.validate().is_ok());

    let bad = MatchConfig {
        greediness: 1.5,
        ..MatchConfig::default()
    };
    assert!(matches!(
        bad.validate(),
        Err(EdgeMatchError::InvalidConfig { .. })
    ));
}
