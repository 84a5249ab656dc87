//! CLI integration tests driving the built binary

#![cfg(feature = "cli")]

use image::{Rgba, RgbaImage};
use matte_compositor::{OutputFormat, OutputFormatHandler};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_matte-compositor"))
}

fn write_cutout(path: &Path) {
    let cutout = RgbaImage::from_fn(2, 2, |x, y| {
        let alpha = [255u8, 0, 128, 64][(y * 2 + x) as usize];
        Rgba([200, 100, 50, alpha])
    });
    std::fs::write(
        path,
        OutputFormatHandler::encode_rgba(&cutout, OutputFormat::Png, 100).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_file_to_file_with_embedded_provider() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cutout.png");
    let output = dir.path().join("out").join("flat.png");
    let matte = dir.path().join("matte.png");
    write_cutout(&input);

    let status = binary()
        .arg(&input)
        .args(["--provider", "embedded", "--background", "#FFFFFF", "-o"])
        .arg(&output)
        .arg("--save-matte")
        .arg(&matte)
        .status()
        .unwrap();
    assert!(status.success());

    let flat = image::open(&output).unwrap().to_rgb8();
    assert_eq!(flat.get_pixel(0, 0).0, [200, 100, 50]);
    assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
    assert!(image::open(&matte).unwrap().color().has_alpha());
}

#[test]
fn test_stdin_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cutout.png");
    write_cutout(&input);
    let bytes = std::fs::read(&input).unwrap();

    let mut child = binary()
        .args(["-", "--provider", "embedded", "--format", "tiff"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&bytes).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let flat = image::load_from_memory(&output.stdout).unwrap().to_rgb8();
    assert_eq!(flat.get_pixel(1, 1).0, [50, 25, 12]);
}

#[test]
fn test_invalid_background_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cutout.png");
    write_cutout(&input);

    let output = binary()
        .arg(&input)
        .args(["--provider", "embedded", "--background", "#12345"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid --background"));
    assert!(!dir.path().join("result.png").exists());
}

#[test]
fn test_missing_sample_is_not_fatal() {
    let dir = TempDir::new().unwrap();

    let status = binary()
        .args(["--provider", "embedded", "--sample"])
        .arg(dir.path().join("Screenshot.png"))
        .current_dir(dir.path())
        .stderr(Stdio::null())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(!dir.path().join("result.png").exists());
}

#[test]
fn test_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cutout.png");
    write_cutout(&input);

    let status = binary()
        .arg(&input)
        .args(["--provider", "embedded", "--format", "jpeg"])
        .current_dir(dir.path())
        .stderr(Stdio::null())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(dir.path().join("result.jpg").exists());
}

#[test]
fn test_sample_with_input_gets_its_own_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cutout.png");
    let sample = dir.path().join("Screenshot.png");
    write_cutout(&input);
    write_cutout(&sample);

    let status = binary()
        .arg(&input)
        .args(["--provider", "embedded", "--background", "#FFFFFF", "--sample"])
        .arg(&sample)
        .current_dir(dir.path())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());

    // The sample keeps default settings, so it is flattened over black
    let flat = image::open(dir.path().join("result.png")).unwrap().to_rgb8();
    assert_eq!(flat.get_pixel(1, 0).0, [255, 255, 255]);
    let sample_flat = image::open(dir.path().join("sample_result.png")).unwrap().to_rgb8();
    assert_eq!(sample_flat.get_pixel(1, 0).0, [0, 0, 0]);
}

#[test]
fn test_matte_and_image_on_stdout_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cutout.png");
    write_cutout(&input);

    let output = binary()
        .arg(&input)
        .args(["--provider", "embedded", "-o", "-", "--save-matte", "-"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--save-matte -"));
}

#[test]
fn test_unknown_extension_warns_but_decodes() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("upload.bin");
    write_cutout(&input);

    let output = binary()
        .arg(&input)
        .args(["--provider", "embedded"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not have an image file extension"));
    assert!(dir.path().join("result.png").exists());
}
