//! Configuration-to-operation wiring, exercised without a GPU.

use framebench_cli::config::{Cli, OpKind, RunConfig};
use framebench_cli::regions::MergeRegions;
use framebench_core::{defaults, DisplacementTable, CELL_SIZE};
use std::path::PathBuf;

fn cli(op: &str, inputs: &[&str]) -> Cli {
    Cli {
        op_type: Some(op.to_string()),
        input0: inputs.first().copied().map(PathBuf::from),
        input1: inputs.get(1).copied().map(PathBuf::from),
        output: Some(PathBuf::from("out.nv12")),
        in_width: defaults::FRAME_WIDTH,
        in_height: defaults::FRAME_HEIGHT,
        out_width: defaults::FRAME_WIDTH,
        out_height: defaults::FRAME_HEIGHT,
        save: true,
        loop_count: 1,
    }
}

#[test]
fn remap_config_produces_a_matching_flip_table() {
    let mut args = cli("remap", &["a.nv12"]);
    args.out_width = 1920;
    args.out_height = 1080;
    let config = RunConfig::from_cli(args).unwrap();
    assert_eq!(config.op, Some(OpKind::Remap));

    let (grid_w, grid_h) = DisplacementTable::grid_size(config.out_width, config.out_height);
    assert_eq!(grid_w, 240);
    assert_eq!(grid_h, 135);

    let table = DisplacementTable::horizontal_flip(grid_w, grid_h);
    assert_eq!(table.width(), grid_w);
    assert_eq!(table.height(), grid_h);

    // Leftmost cell samples from the right edge, rightmost from the left.
    assert_eq!(table.get(0, 0).x, (grid_w * CELL_SIZE) as f32);
    assert_eq!(table.get(grid_w - 1, 0).x, CELL_SIZE as f32);
    // Rows are untouched by a horizontal flip.
    for y in [0, grid_h / 2, grid_h - 1] {
        assert_eq!(table.get(0, y).y, (y * CELL_SIZE) as f32);
    }
}

#[test]
fn blend_with_a_single_input_fails_before_any_setup() {
    let args = cli("blend", &["a.nv12"]);
    let err = RunConfig::from_cli(args).unwrap_err();
    assert!(err.to_string().contains("blend needs 2 input files"));
}

#[test]
fn blend_config_yields_full_frame_merge_regions() {
    let mut args = cli("blend", &["a.nv12", "b.nv12"]);
    args.in_width = 640;
    args.in_height = 480;
    let config = RunConfig::from_cli(args).unwrap();

    let sizes: Vec<(u32, u32)> = config
        .inputs
        .iter()
        .map(|_| (config.in_width, config.in_height))
        .collect();
    let regions = MergeRegions::new(config.out_width, config.out_height, &sizes);

    assert_eq!(regions.window.width, config.out_width);
    assert_eq!(regions.window.height, config.out_height);
    assert_eq!(regions.areas.len(), 2);
    for area in &regions.areas {
        assert!(area.fits_in(config.in_width, config.in_height));
    }
}

#[test]
fn copy_config_resolves_documented_defaults() {
    let config = RunConfig::from_cli(cli("copy", &["a.nv12"])).unwrap();
    assert_eq!(config.op, Some(OpKind::Copy));
    assert_eq!(config.in_width, 1280);
    assert_eq!(config.in_height, 800);
    assert_eq!(config.out_width, 1280);
    assert_eq!(config.out_height, 800);
    assert!(config.save);
    assert_eq!(config.loop_count, 1);
}

#[test]
fn unrecognized_type_is_a_configuration_error() {
    let err = RunConfig::from_cli(cli("rotate", &["a.nv12"])).unwrap_err();
    assert!(err.to_string().contains("unknown operation type"));
}

#[test]
fn omitted_type_reaches_dispatch_as_unset() {
    let mut args = cli("copy", &["a.nv12"]);
    args.op_type = None;
    let config = RunConfig::from_cli(args).unwrap();
    assert_eq!(config.op, None);
}
