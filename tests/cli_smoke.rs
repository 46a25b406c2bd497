use std::path::PathBuf;

fn bin_path() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_slidereel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "slidereel.exe"
            } else {
                "slidereel"
            });
            p
        })
}

fn write_request(dir: &PathBuf) -> PathBuf {
    for (name, color) in [("a.png", [220u8, 30, 30]), ("b.png", [30, 220, 30])] {
        let img = image::RgbImage::from_pixel(64, 48, image::Rgb(color));
        img.save(dir.join(name)).unwrap();
    }

    let request = serde_json::json!({
        "images": [
            {"timestamp": 0.0, "image_path": dir.join("a.png"), "effect": "pan_right"},
            {"timestamp": 2.0, "image_path": dir.join("b.png")}
        ],
        "output_path": dir.join("out.mp4"),
        "transition_type": "cross_dissolve",
        "resolution": {"width": 64, "height": 48}
    });

    let path = dir.join("request.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&request).unwrap()).unwrap();
    path
}

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke").join("frame");
    std::fs::create_dir_all(&dir).unwrap();
    let request_path = write_request(&dir);
    let out_path = dir.join("frame.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(bin_path())
        .args(["frame", "--in"])
        .arg(&request_path)
        .args(["--time", "1.0", "--out"])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let decoded = image::open(&out_path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (64, 48));
}

#[test]
fn cli_lists_registered_names() {
    let output = std::process::Command::new(bin_path())
        .arg("list-effects")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "static"));
    assert!(stdout.lines().any(|l| l == "pan_diagonal_br"));

    let output = std::process::Command::new(bin_path())
        .arg("list-transitions")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "cross_dissolve"));
    assert!(stdout.lines().any(|l| l == "blur_zoom"));
}

#[test]
fn cli_render_produces_mp4_when_ffmpeg_present() {
    if !slidereel::is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }

    let dir = PathBuf::from("target").join("cli_smoke").join("render");
    std::fs::create_dir_all(&dir).unwrap();
    let request_path = write_request(&dir);
    let out_path = dir.join("out.mp4");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(bin_path())
        .args(["render", "--in"])
        .arg(&request_path)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
    assert!(std::fs::metadata(&out_path).unwrap().len() > 0);
}
