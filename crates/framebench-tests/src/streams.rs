//! Stream setup scenarios driven by the resolved configuration.

use framebench_cli::config::{Cli, RunConfig};
use framebench_core::{defaults, PixelFormat, VideoInfo};
use framebench_stream::{ContainerFormat, VideoStream};
use std::path::PathBuf;

#[test]
fn save_false_never_touches_the_output_file() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let out_path = tmp.path().join("out.nv12");

    let config = RunConfig::from_cli(Cli {
        op_type: Some("copy".to_string()),
        input0: Some(PathBuf::from("a.nv12")),
        input1: None,
        output: Some(out_path.clone()),
        in_width: defaults::FRAME_WIDTH,
        in_height: defaults::FRAME_HEIGHT,
        out_width: defaults::FRAME_WIDTH,
        out_height: defaults::FRAME_HEIGHT,
        save: false,
        loop_count: 5,
    })
    .unwrap();
    assert!(!config.save);

    // The harness only opens the writer when save is set.
    let mut output = VideoStream::new(&config.output);
    output.set_dimensions(config.out_width, config.out_height);
    if config.save {
        output.open_writer().unwrap();
    }

    assert!(!out_path.exists());
    assert!(output.write_buf().is_err());
    assert_eq!(output.frames_written(), 0);
}

#[test]
fn raw_input_file_opens_and_sizes_cleanly() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let in_path = tmp.path().join("clip.nv12");

    let info = VideoInfo::new(PixelFormat::Nv12, 640, 480).unwrap();
    let two_frames = vec![0x80u8; info.frame_size() * 2];
    std::fs::write(&in_path, &two_frames).unwrap();

    let mut stream = VideoStream::new(&in_path);
    stream.set_dimensions(640, 480);
    assert_eq!(
        stream.estimate_file_format().unwrap(),
        ContainerFormat::RawFrames
    );
    stream.open_reader().unwrap();

    let file_len = std::fs::metadata(&in_path).unwrap().len() as usize;
    assert_eq!(file_len % info.frame_size(), 0);
    assert_eq!(file_len / info.frame_size(), 2);
}

#[test]
fn input_readers_do_not_gate_on_extension() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let in_path = tmp.path().join("capture.bin");
    std::fs::write(&in_path, vec![0u8; 64]).unwrap();

    // Format detection is an output-side concern; any readable file
    // is a valid input source.
    let mut stream = VideoStream::new(&in_path);
    stream.set_dimensions(640, 480);
    stream.open_reader().unwrap();
}

#[test]
fn nv12_frame_size_matches_stream_expectations() {
    let info = VideoInfo::new(PixelFormat::Nv12, 1280, 800).unwrap();
    // Y plane plus half-resolution interleaved UV.
    assert_eq!(info.frame_size(), 1280 * 800 * 3 / 2);
}
