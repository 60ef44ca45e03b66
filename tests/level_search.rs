use edgematch::lowlevel::{scan_level, score_model_at};
use edgematch::{
    EdgeMatchError, GradientField, ImageView, ScanParams, ScanWindow, TemplateLibrary, TrainConfig,
};

fn l_shape(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size * size];
    for y in 0..size {
        for x in 0..size {
            let bar = (12..52).contains(&x) && (20..34).contains(&y);
            let foot = (12..26).contains(&x) && (34..50).contains(&y);
            if bar || foot {
                data[y * size + x] = 200;
            }
        }
    }
    data
}

struct Scene {
    library: TemplateLibrary,
    field: GradientField,
    expected: (usize, usize),
}

fn scene() -> Scene {
    let tpl_size = 64;
    let tpl = l_shape(tpl_size);
    let tpl_view = ImageView::from_slice(&tpl, tpl_size, tpl_size).unwrap();
    let library = TemplateLibrary::train(
        tpl_view,
        TrainConfig {
            pyramid_levels: 1,
            rotations_deg: vec![0.0, 90.0],
            ..TrainConfig::default()
        },
    )
    .unwrap();

    let (img_w, img_h) = (160, 128);
    let (x0, y0) = (40, 30);
    let mut image = vec![0u8; img_w * img_h];
    for y in 0..tpl_size {
        let start = (y0 + y) * img_w + x0;
        image[start..start + tpl_size].copy_from_slice(&tpl[y * tpl_size..(y + 1) * tpl_size]);
    }
    let view = ImageView::from_slice(&image, img_w, img_h).unwrap();
    let field = GradientField::sobel(view);

    let (ax, ay) = library.model(0, 0).unwrap().anchor();
    let expected = (
        x0 + (ax - 0.5).ceil() as usize,
        y0 + (ay - 0.5).ceil() as usize,
    );
    Scene {
        library,
        field,
        expected,
    }
}

#[test]
fn scores_stay_within_threshold_and_one() {
    let s = scene();
    let params = ScanParams {
        step: 1,
        min_score: 0.4,
        greediness: 0.5,
    };
    let window = ScanWindow::full(s.field.width(), s.field.height());
    let found = scan_level(&s.field, &s.library, 0, window, &params, None).unwrap();

    assert!(!found.is_empty());
    for m in &found {
        assert!(m.score > 0.4 && m.score <= 1.0, "{m:?}");
        assert_eq!(m.level, 0);
    }
    for pair in found.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    let best = found[0];
    assert_eq!((best.x, best.y), s.expected);
    assert_eq!(best.variant, 0);
}

#[test]
fn greedy_results_are_a_subset_of_exhaustive_results() {
    let s = scene();
    let window = ScanWindow::full(s.field.width(), s.field.height());
    let exhaustive = ScanParams {
        step: 1,
        min_score: 0.5,
        greediness: 0.0,
    };
    let greedy = ScanParams {
        greediness: 0.9,
        ..exhaustive
    };

    let all = scan_level(&s.field, &s.library, 0, window, &exhaustive, None).unwrap();
    let pruned = scan_level(&s.field, &s.library, 0, window, &greedy, None).unwrap();

    assert!(pruned.len() <= all.len());
    assert_eq!(pruned[0], all[0]);
    for m in &pruned {
        assert!(all.contains(m), "{m:?} missing from exhaustive scan");
    }
}

#[test]
fn exhaustive_scan_agrees_with_pointwise_scoring() {
    let s = scene();
    let params = ScanParams {
        step: 1,
        min_score: 0.6,
        greediness: 0.0,
    };
    let window = ScanWindow::centered(
        s.expected.0,
        s.expected.1,
        9,
        s.field.width(),
        s.field.height(),
    );
    let found = scan_level(&s.field, &s.library, 0, window, &params, Some(0)).unwrap();

    let model = s.library.model(0, 0).unwrap();
    for y in window.y0..window.y1 {
        for x in window.x0..window.x1 {
            let direct = score_model_at(&s.field, model, x, y, &params);
            let scanned = found.iter().find(|m| m.x == x && m.y == y).map(|m| m.score);
            assert_eq!(direct, scanned, "placement ({x}, {y})");
        }
    }
}

#[test]
fn roi_restricts_positions_only() {
    let s = scene();
    let params = ScanParams {
        step: 1,
        min_score: 0.5,
        greediness: 0.0,
    };
    let full = scan_level(
        &s.field,
        &s.library,
        0,
        ScanWindow::full(s.field.width(), s.field.height()),
        &params,
        None,
    )
    .unwrap();
    let roi = ScanWindow::centered(
        s.expected.0,
        s.expected.1,
        10,
        s.field.width(),
        s.field.height(),
    );
    let local = scan_level(&s.field, &s.library, 0, roi, &params, None).unwrap();

    assert!(!local.is_empty());
    for m in &local {
        assert!(m.x >= roi.x0 && m.x < roi.x1 && m.y >= roi.y0 && m.y < roi.y1);
        // Same gradients as the full scan, so the same score.
        let same = full
            .iter()
            .find(|f| f.x == m.x && f.y == m.y && f.variant == m.variant)
            .unwrap();
        assert_eq!(same.score, m.score);
    }
    assert_eq!((local[0].x, local[0].y), s.expected);
}

#[test]
fn fixed_variant_limits_models() {
    let s = scene();
    let params = ScanParams {
        step: 2,
        min_score: 0.3,
        greediness: 0.8,
    };
    let window = ScanWindow::full(s.field.width(), s.field.height());
    let found = scan_level(&s.field, &s.library, 0, window, &params, Some(1)).unwrap();
    assert!(found.iter().all(|m| m.variant == 1 && m.angle_deg == 90.0));
    assert!(found.iter().all(|m| m.x % 2 == 0 && m.y % 2 == 0));

    let none = scan_level(&s.field, &s.library, 0, window, &params, Some(9)).unwrap();
    assert!(none.is_empty());
}

#[test]
fn unknown_level_is_an_error() {
    let s = scene();
    let window = ScanWindow::full(s.field.width(), s.field.height());
    let err = scan_level(&s.field, &s.library, 3, window, &ScanParams::default(), None)
        .err()
        .unwrap();
    assert_eq!(
        err,
        EdgeMatchError::IndexOutOfBounds {
            index: 3,
            len: 1,
            context: "level",
        }
    );
}
