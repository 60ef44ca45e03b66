use criterion::{criterion_group, criterion_main, Criterion};
use edgematch::lowlevel::transform_u8;
use edgematch::{ImageView, MatchConfig, Matcher, TemplateLibrary, TrainConfig};
use std::hint::black_box;

fn make_template(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size * size];
    let margin = size / 5;
    for y in margin..size - margin {
        for x in margin..size - margin {
            let inner = x >= margin + 3
                && x < size - margin - 3
                && y >= margin + 3
                && y < size - margin - 3;
            if !inner || (x + y) % 17 == 0 {
                data[y * size + x] = 220;
            }
        }
    }
    data
}

fn make_scene(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = 40 + (((x * 13) ^ (y * 7)) & 0x0F);
            data.push(value as u8);
        }
    }
    data
}

fn paste(
    scene: &mut [u8],
    scene_width: usize,
    patch: &[u8],
    pw: usize,
    ph: usize,
    x0: usize,
    y0: usize,
) {
    for y in 0..ph {
        for x in 0..pw {
            let v = patch[y * pw + x];
            if v > 0 {
                scene[(y0 + y) * scene_width + x0 + x] = v;
            }
        }
    }
}

fn bench_matcher(c: &mut Criterion) {
    let img_width = 512;
    let img_height = 512;
    let tpl_size = 96;
    let tpl = make_template(tpl_size);
    let tpl_view = ImageView::from_slice(&tpl, tpl_size, tpl_size).unwrap();

    let mut scene = make_scene(img_width, img_height);
    paste(&mut scene, img_width, &tpl, tpl_size, tpl_size, 160, 200);
    let scene_view = ImageView::from_slice(&scene, img_width, img_height).unwrap();

    c.bench_function("train_rotation_off", |b| {
        b.iter(|| black_box(TemplateLibrary::train(tpl_view, TrainConfig::default()).unwrap()));
    });

    let library = TemplateLibrary::train(tpl_view, TrainConfig::default()).unwrap();
    let matcher = Matcher::new(library).with_config(MatchConfig::default());
    c.bench_function("match_rotation_off", |b| {
        b.iter(|| black_box(matcher.match_image(scene_view).unwrap()));
    });

    let exhaustive = matcher.clone().with_config(MatchConfig {
        greediness: 0.0,
        ..MatchConfig::default()
    });
    c.bench_function("match_rotation_off_exhaustive", |b| {
        b.iter(|| black_box(exhaustive.match_image(scene_view).unwrap()));
    });

    let rotated = transform_u8(tpl_view, 1.0, 20.0, 0).unwrap();
    let mut scene_rot = make_scene(img_width, img_height);
    paste(
        &mut scene_rot,
        img_width,
        rotated.data(),
        rotated.width(),
        rotated.height(),
        160,
        200,
    );
    let scene_rot_view = ImageView::from_slice(&scene_rot, img_width, img_height).unwrap();

    let train_rot = TrainConfig::default()
        .with_rotation_range(-40.0, 40.0, 5.0)
        .unwrap();
    let library_rot = TemplateLibrary::train(tpl_view, train_rot.clone()).unwrap();
    let matcher_rot = Matcher::new(library_rot);
    c.bench_function("match_rotation_on", |b| {
        b.iter(|| black_box(matcher_rot.match_image(scene_rot_view).unwrap()));
    });

    #[cfg(feature = "rayon")]
    {
        let train_par = TrainConfig {
            parallel: true,
            ..train_rot
        };
        c.bench_function("train_rotation_on_parallel", |b| {
            b.iter(|| black_box(TemplateLibrary::train(tpl_view, train_par.clone()).unwrap()));
        });

        let matcher_rot_par = matcher_rot.clone().with_config(MatchConfig {
            parallel: true,
            ..MatchConfig::default()
        });
        c.bench_function("match_rotation_on_parallel", |b| {
            b.iter(|| black_box(matcher_rot_par.match_image(scene_rot_view).unwrap()));
        });
    }
}

criterion_group!(benches, bench_matcher);
criterion_main!(benches);
