use serde_json::{json, Map};

use stokes_fluids::Simulation;
use stokes_io::{SnapshotDecoder, SnapshotEncoder};
use stokes_params::{ShapeType, SimulationConfig};

#[test]
fn keywords_to_snapshot_directory() {
    let resolved = stokes_params::infer(["swirling vortex"]);
    assert_eq!(resolved.sim.initial_shape_type, ShapeType::Vortex);

    // Explicit overrides win; out-of-range values are corrected silently.
    // Visualization keys ride along in the same mapping.
    let mut overrides = Map::new();
    overrides.insert("grid_resolution".into(), json!([41, 41]));
    overrides.insert("time_steps".into(), json!(40));
    overrides.insert("viscosity".into(), json!(50.0));
    overrides.insert("arrow_color".into(), json!([0.0, 1.0, 0.0]));

    let merged = stokes_params::merge(&resolved.sim, &overrides);
    let (config, corrections) = stokes_params::validate(&merged);

    assert_eq!(config.grid_resolution, [41, 41]);
    assert_eq!(config.time_steps, 40);
    assert_eq!(config.viscosity, 1.0);
    assert_eq!(corrections.len(), 1);

    // The explicit color override reaches the visualization metadata that
    // the consumer reads, replacing the inferred default.
    let viz = stokes_params::merge_viz(&resolved.viz, &overrides);
    assert_eq!(viz.arrow_color, [0.0, 1.0, 0.0]);

    let dir = tempfile::tempdir().unwrap();
    let encoder = SnapshotEncoder::create(dir.path(), config.time_steps).unwrap();

    let viz_path = dir.path().join("viz_params.json");
    serde_json::to_writer_pretty(std::fs::File::create(&viz_path).unwrap(), &viz).unwrap();

    encoder
        .encode_metadata(
            [config.nx(), config.ny()],
            config.time_steps,
            SimulationConfig::SNAPSHOT_INTERVAL,
            [SimulationConfig::DOMAIN_SIZE; 2],
        )
        .unwrap();

    for event in Simulation::new(config.clone()).snapshots() {
        let snapshot = event.unwrap();
        encoder.encode_snapshot(&snapshot).unwrap();
    }

    let decoder = SnapshotDecoder::new(dir.path());
    let meta = decoder.decode_metadata().unwrap();
    assert_eq!(meta.grid, [41, 41]);
    assert_eq!(meta.time_steps, 40);

    // 40 steps at interval 10 retain steps 0, 10, 20, 30.
    let snapshots = decoder.decode_all().unwrap();
    let steps: Vec<usize> = snapshots.iter().map(|s| s.step).collect();
    assert_eq!(steps, vec![0, 10, 20, 30]);

    // The pass-through metadata is loadable next to the records and carries
    // the overridden color.
    let written: stokes_params::VisualizationParams =
        serde_json::from_reader(std::fs::File::open(&viz_path).unwrap()).unwrap();
    assert_eq!(written.arrow_color, [0.0, 1.0, 0.0]);
    assert_eq!(written.arrow_scale_factor, 1.0);

    // Consumer contract: the first record's coordinates are the canonical
    // grid for the whole run.
    let canonical_x = &snapshots[0].x;
    let canonical_y = &snapshots[0].y;
    for snapshot in &snapshots {
        assert_eq!(&snapshot.x, canonical_x);
        assert_eq!(&snapshot.y, canonical_y);
        assert!(snapshot.u.iter().all(|c| c.is_finite()));
        assert!(snapshot.p.iter().all(|c| c.is_finite()));
    }
}

#[test]
fn interrupted_run_leaves_valid_records() {
    let config = SimulationConfig {
        grid_resolution: [21, 21],
        time_steps: 100,
        viscosity: 0.1,
        initial_shape_type: ShapeType::Vortex,
        vortex_strength: 0.2,
        initial_velocity: [0.0, 0.0],
        source_strength: 0.0,
        ..SimulationConfig::default()
    };

    let dir = tempfile::tempdir().unwrap();
    let encoder = SnapshotEncoder::create(dir.path(), config.time_steps).unwrap();

    // Stop consuming partway through, as an interrupted process would.
    let mut events = Simulation::new(config).snapshots();
    for _ in 0..3 {
        let snapshot = events.next().unwrap().unwrap();
        encoder.encode_snapshot(&snapshot).unwrap();
    }
    drop(events);

    let decoder = SnapshotDecoder::new(dir.path());
    let snapshots = decoder.decode_all().unwrap();
    assert_eq!(snapshots.len(), 3);
    for snapshot in snapshots {
        assert_eq!(snapshot.u.dim(), (21, 21));
    }
}
