//! End-to-end behaviour of the denoising pipeline

use mesh_common::{
    AnyStore, FrameStore, MeshAnimation, ObjSequenceStore, Topology, VCacheStore, Vec3,
};
use mesh_denoise::{
    BilateralParams, CancelFlag, Denoise, DenoiseError, Denoiser, FrameRange, FrameWindow,
    Pipeline, Preset, TemporalParams, WeightKernel,
};
use tempfile::tempdir;

fn line(xs: &[f32]) -> MeshAnimation {
    let positions = xs.iter().map(|&x| vec![Vec3::new(x, 0.0, 0.0)]).collect();
    MeshAnimation::from_positions(Topology::new("line", 1), 1, positions).unwrap()
}

/// Deterministic jittery animation of a small quad strip
fn noisy_strip(frames: u32) -> MeshAnimation {
    let topology = Topology::new("strip", 6).with_faces(vec![4, 4], vec![0, 1, 4, 3, 1, 2, 5, 4]);
    let positions = (0..frames)
        .map(|f| {
            (0..6)
                .map(|v| {
                    let t = f as f32 * 0.1;
                    let jitter = ((f * 31 + v * 17) % 13) as f32 * 0.01 - 0.06;
                    Vec3::new(
                        (v % 3) as f32 + t,
                        (v / 3) as f32 + jitter,
                        (t * 2.0).sin() * 0.5 + jitter,
                    )
                })
                .collect()
        })
        .collect();
    MeshAnimation::from_positions(topology, 1, positions).unwrap()
}

fn xs(animation: &MeshAnimation) -> Vec<f32> {
    animation.trajectory(0).map(|p| p.x).collect()
}

fn temporal(window: usize, kernel: WeightKernel, sigma: f32) -> Denoiser {
    Denoiser::temporal(TemporalParams::new(window, kernel, sigma).unwrap()).unwrap()
}

fn bilateral(window: usize, sigma_temporal: f32, sigma_spatial: f32) -> Denoiser {
    Denoiser::bilateral(BilateralParams::new(window, sigma_temporal, sigma_spatial).unwrap())
        .unwrap()
}

#[test]
fn weights_sum_to_one_for_every_frame_and_vertex() {
    let animation = noisy_strip(12);
    let frames = animation.frames();
    let adaptive = BilateralParams::new(7, 2.0, 0.3)
        .unwrap()
        .with_motion_threshold(0.05)
        .unwrap()
        .with_edge_threshold(0.08)
        .unwrap();
    let denoisers = [
        temporal(5, WeightKernel::Linear, 1.0),
        temporal(7, WeightKernel::Gaussian, 1.5),
        bilateral(9, 4.0, 0.25),
        Denoiser::bilateral(adaptive).unwrap(),
    ];

    for denoiser in &denoisers {
        let plans = denoiser.plan(frames);
        for (i, plan) in plans.iter().enumerate() {
            let window = FrameWindow::new(frames, i, *plan);
            for v in 0..animation.vertex_count() {
                let sum: f32 = denoiser
                    .normalized_weights(&window, v)
                    .iter()
                    .map(|&(_, w)| w)
                    .sum();
                assert!(
                    (sum - 1.0).abs() < 1e-5,
                    "{} frame {} vertex {}: {}",
                    denoiser.name(),
                    i + 1,
                    v,
                    sum
                );
            }
        }
    }
}

#[test]
fn linear_window_one_is_identity_and_idempotent() {
    let input = noisy_strip(8);
    let pipeline = Pipeline::new(temporal(1, WeightKernel::Linear, 1.0));
    let once = pipeline.run(&input).unwrap();
    let twice = pipeline.run(&once).unwrap();
    assert_eq!(once, input);
    assert_eq!(twice, once);
}

#[test]
fn infinite_spatial_sigma_matches_temporal_gaussian() {
    let input = noisy_strip(10);
    let gaussian = Pipeline::new(temporal(5, WeightKernel::Gaussian, 1.7))
        .run(&input)
        .unwrap();
    let unbounded = Pipeline::new(bilateral(5, 1.7, f32::INFINITY))
        .run(&input)
        .unwrap();
    assert_eq!(gaussian, unbounded);

    let huge = Pipeline::new(bilateral(5, 1.7, 1e6)).run(&input).unwrap();
    for (a, b) in gaussian.frames().iter().zip(huge.frames()) {
        for (p, q) in a.positions.iter().zip(&b.positions) {
            assert!(p.distance(*q) < 1e-4);
        }
    }
}

#[test]
fn bilateral_preserves_sharp_jump() {
    let input = line(&[0.0, 1.0, 2.0, 10.0, 11.0]);
    let smoothed = xs(&Pipeline::new(temporal(3, WeightKernel::Linear, 1.0))
        .run(&input)
        .unwrap());
    let preserved = xs(&Pipeline::new(bilateral(3, 1.0, 1.0)).run(&input).unwrap());

    // Temporal: (0.5·2 + 10 + 0.5·11) / 2
    assert!((smoothed[3] - 8.25).abs() < 1e-5);
    assert!((preserved[3] - 10.0).abs() < (smoothed[3] - 10.0).abs());
    assert!(preserved[3] > 10.0 && preserved[3] < 11.0);
}

#[test]
fn reversed_range_is_invalid() {
    let err = FrameRange::new(10, 5).unwrap_err();
    assert!(matches!(err, DenoiseError::InvalidRange { start: 10, end: 5, .. }));
}

#[test]
fn overlong_range_is_clamped() {
    let input = noisy_strip(50);
    let pipeline = Pipeline::new(temporal(5, WeightKernel::Linear, 1.0))
        .with_range(FrameRange::new(1, 100).unwrap());
    assert_eq!(pipeline.resolve_range(&input).unwrap(), FrameRange::new(1, 50).unwrap());

    let clamped = pipeline.run(&input).unwrap();
    let full = Pipeline::new(temporal(5, WeightKernel::Linear, 1.0))
        .run(&input)
        .unwrap();
    assert_eq!(clamped, full);
}

#[test]
fn disjoint_range_is_invalid() {
    let input = noisy_strip(20);
    let pipeline =
        Pipeline::new(bilateral(3, 1.0, 1.0)).with_range(FrameRange::new(30, 40).unwrap());
    assert!(matches!(pipeline.run(&input), Err(DenoiseError::InvalidRange { .. })));
}

#[test]
fn presets_reduce_jitter() {
    let input = noisy_strip(30);
    // Y only carries jitter, so its frame-to-frame second difference is pure noise
    let roughness = |animation: &MeshAnimation| -> f32 {
        animation
            .frames()
            .windows(3)
            .map(|w| {
                (0..animation.vertex_count())
                    .map(|v| {
                        (2.0 * w[1].positions[v].y - w[0].positions[v].y - w[2].positions[v].y)
                            .abs()
                    })
                    .sum::<f32>()
            })
            .sum()
    };

    let noisy = roughness(&input);
    let smoothed: Vec<f32> = Preset::ALL
        .iter()
        .map(|preset| {
            let out = Pipeline::new(Denoiser::bilateral(preset.params()).unwrap())
                .run(&input)
                .unwrap();
            roughness(&out)
        })
        .collect();

    for (preset, r) in Preset::ALL.iter().zip(&smoothed) {
        assert!(*r < noisy, "{} left jitter at {} (input {})", preset, r, noisy);
    }
    assert!(smoothed[2] < smoothed[0]);
}

#[test]
fn cancelled_job_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.vcache");
    let output = dir.path().join("out.vcache");
    VCacheStore.save(&input, &noisy_strip(6)).unwrap();

    let cancel = CancelFlag::new();
    let pipeline = Pipeline::new(bilateral(3, 1.0, 0.5)).with_cancel_flag(cancel.clone());
    cancel.cancel();

    let err = pipeline
        .process_file(&VCacheStore, &input, &VCacheStore, &output)
        .unwrap_err();
    assert!(matches!(err, DenoiseError::Cancelled));
    assert!(!output.exists());
}

#[test]
fn vcache_round_trip_is_bit_exact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("strip.vcache");
    let animation = noisy_strip(9);

    VCacheStore.save(&path, &animation).unwrap();
    let loaded = VCacheStore.load(&path).unwrap();
    assert_eq!(loaded.topology(), animation.topology());
    for (a, b) in loaded.frames().iter().zip(animation.frames()) {
        assert_eq!(a.number, b.number);
        for (p, q) in a.positions.iter().zip(&b.positions) {
            assert_eq!(p.to_array().map(f32::to_bits), q.to_array().map(f32::to_bits));
        }
    }
}

#[test]
fn process_file_between_stores() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scan");
    let output = dir.path().join("clean.vcache");
    ObjSequenceStore.save(&input, &noisy_strip(12)).unwrap();

    let input_store = AnyStore::for_path(&input).unwrap();
    let output_store = AnyStore::for_path(&output).unwrap();
    let pipeline = Pipeline::new(Denoiser::bilateral(Preset::Subtle.params()).unwrap())
        .with_range(FrameRange::new(3, 10).unwrap())
        .with_passes(2)
        .unwrap();
    let report = pipeline
        .process_file(&input_store, &input, &output_store, &output)
        .unwrap();

    assert_eq!(report.frames_processed, 8);
    assert_eq!(report.passes, 2);
    let written = VCacheStore.load(&output).unwrap();
    assert_eq!(written.frame_count(), 12);
    assert_eq!(written.topology().face_count(), 2);
}
