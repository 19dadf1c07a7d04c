//! Loading options files the way the demos do.

use cumulus::*;
use serde_json::json;

#[test]
fn test_options_file_drives_software_render() {
    let dir = std::env::temp_dir().join("cumulus_options_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("small.json");

    let config = json!({
        "noise": {
            "resolution": 24,
            "scale": [0.1, 0.1, 0.1],
            "falloff_radius": null
        },
        "march": {
            "threshold": 0.55,
            "opacity": 3.0,
            "range": 0.0,
            "steps": 0,
            "base_color": [1.0, 0.5, 0.25]
        },
        "background_color": [0.0, 0.0, 0.0]
    });
    std::fs::write(&path, config.to_string()).unwrap();

    let options = Options::load(&path).unwrap();
    assert_eq!(options.noise.resolution, 24);
    assert_eq!(options.noise.falloff_radius, None);
    assert_eq!(options.march.opacity, 1.0);
    assert_eq!(options.march.steps, 1);
    // Missing keys fall back to the cloud preset.
    assert_eq!(options.spin_speed, Options::cloud().spin_speed);

    let image = render_software(&options, 32, 24).unwrap();
    assert_eq!(image.pixels.len(), 32 * 24 * 4);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_saved_options_reload_identically() {
    let mut options = Options::perlin();
    options.seed = Some(7);
    options.march.steps = 64;

    let text = options.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["seed"], 7);
    assert_eq!(value["march"]["steps"], 64);

    assert_eq!(Options::from_json(&text).unwrap(), options);
}

#[test]
fn test_malformed_options_are_rejected() {
    assert!(Options::from_json("{ \"noise\": 5 }").is_err());
    assert!(Options::load("/nonexistent/cumulus/options.json").is_err());
}
