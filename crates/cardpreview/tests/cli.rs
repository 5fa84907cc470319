use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

const COLOR: [u8; 4] = [200, 120, 40, 255];
const MATTE: [u8; 4] = [90, 90, 90, 255];

/// 4x2 side-by-side frame: solid colour on the left, solid matte on the right.
fn packed_frame() -> RgbaImage {
    let mut frame = RgbaImage::new(4, 2);
    for y in 0..2 {
        for x in 0..2 {
            frame.put_pixel(x, y, Rgba(COLOR));
            frame.put_pixel(x + 2, y, Rgba(MATTE));
        }
    }
    frame
}

fn cardpreview(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cardpreview"))
        .env("CARDPREVIEW_CONFIG_DIR", config_dir)
        .env_remove("CARDPREVIEW_CONFIG")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run cardpreview")
}

fn write_frames(dir: &Path, count: usize) {
    fs::create_dir_all(dir).unwrap();
    for index in 0..count {
        packed_frame()
            .save(dir.join(format!("{index:03}.png")))
            .unwrap();
    }
}

fn written_frames(dir: &Path) -> Vec<RgbaImage> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    paths.sort();
    paths
        .iter()
        .map(|path| image::open(path).unwrap().to_rgba8())
        .collect()
}

#[test]
fn render_composites_with_cpu_backend() {
    let root = TempDir::new().unwrap();
    let frame_path = root.path().join("frame.png");
    let out_path = root.path().join("out.png");
    packed_frame().save(&frame_path).unwrap();

    let output = cardpreview(
        root.path(),
        &[
            "render",
            "--frame",
            frame_path.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
            "--backend",
            "cpu",
            "--size",
            "2x2",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let composited = image::open(&out_path).unwrap().to_rgba8();
    assert_eq!(composited.dimensions(), (2, 2));
    for pixel in composited.pixels() {
        assert_eq!(pixel.0, [COLOR[0], COLOR[1], COLOR[2], MATTE[0]]);
    }
}

#[test]
fn play_shades_mp4_sources() {
    let root = TempDir::new().unwrap();
    let frames = root.path().join("frames");
    let out_dir = root.path().join("out");
    write_frames(&frames, 3);

    let output = cardpreview(
        root.path(),
        &[
            "play",
            "--url",
            "https://cdn.example.com/cards/holo.mp4",
            "--frames",
            frames.to_str().unwrap(),
            "--duration",
            "400ms",
            "--loop",
            "--backend",
            "cpu",
            "--out-dir",
            out_dir.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let drawn = written_frames(&out_dir);
    assert!(!drawn.is_empty(), "expected at least one drawn frame");
    for frame in drawn {
        // 2x2 sub-image scaled by 0.8 rounds back to 2x2.
        assert_eq!(frame.dimensions(), (2, 2));
        assert!(frame
            .pixels()
            .all(|pixel| pixel.0 == [COLOR[0], COLOR[1], COLOR[2], MATTE[0]]));
    }
}

#[test]
fn play_leaves_other_sources_unshaded() {
    let root = TempDir::new().unwrap();
    let frames = root.path().join("frames");
    let out_dir = root.path().join("out");
    write_frames(&frames, 2);

    let output = cardpreview(
        root.path(),
        &[
            "play",
            "--url",
            "https://cdn.example.com/cards/holo.webm",
            "--frames",
            frames.to_str().unwrap(),
            "--duration",
            "400ms",
            "--loop",
            "--backend",
            "cpu",
            "--out-dir",
            out_dir.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let drawn = written_frames(&out_dir);
    assert!(!drawn.is_empty());
    for frame in drawn {
        assert_eq!(frame, packed_frame());
    }
}

#[test]
fn shaders_are_exported() {
    let root = TempDir::new().unwrap();
    let out_dir = root.path().join("glsl");

    let output = cardpreview(root.path(), &["shaders", "--out-dir", out_dir.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    for name in ["matte.vert", "horizontal.frag", "vertical.frag"] {
        let source = fs::read_to_string(out_dir.join(name)).unwrap();
        assert!(source.starts_with("#version 450"), "{name} missing version line");
    }

    let output = cardpreview(root.path(), &["shaders"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("// horizontal.frag"));
    assert!(stdout.contains("matte.r"));
}

#[test]
fn invalid_config_is_rejected() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("cardpreview.toml"),
        "version = 1\n\n[playback]\nfps = 0\n",
    )
    .unwrap();

    let output = cardpreview(root.path(), &["shaders"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("playback.fps"));
}
