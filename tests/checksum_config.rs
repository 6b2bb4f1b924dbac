use std::sync::Mutex;

use tempfile::Builder;

use frame_checksum::{ChecksumAlgorithm, ChecksumConfig, CropRegion, PixelFormat};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in ["CHECKSUM_CONFIG", "CHECKSUM_TYPE", "CHECKSUM_PLANES"] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_without_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ChecksumConfig::load().expect("load config");
    assert_eq!(cfg.settings.algorithm, ChecksumAlgorithm::Sha1);
    assert!(!cfg.settings.plane_checksum);
    assert_eq!(cfg.geometry.crop, None);
}

#[test]
fn loads_json_config_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".json").tempfile().expect("temp config");
    let json = r#"{
        "checksum_type": "md5",
        "plane_checksum": false,
        "frame": {
            "format": "yv12",
            "width": 640,
            "height": 480,
            "crop": { "width": 320, "height": 240 }
        },
        "strides": { "y": 704, "uv": 352 }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("CHECKSUM_CONFIG", file.path());
    std::env::set_var("CHECKSUM_TYPE", "sha256");
    std::env::set_var("CHECKSUM_PLANES", "true");

    let cfg = ChecksumConfig::load().expect("load config");

    assert_eq!(cfg.settings.algorithm, ChecksumAlgorithm::Sha256);
    assert!(cfg.settings.plane_checksum);
    assert_eq!(cfg.geometry.format, PixelFormat::Yv12);
    assert_eq!(cfg.geometry.width, 640);
    assert_eq!(cfg.geometry.height, 480);
    assert_eq!(cfg.geometry.crop, Some(CropRegion::new(320, 240)));
    assert_eq!(cfg.strides.y, Some(704));
    assert_eq!(cfg.strides.uv, Some(352));

    clear_env();
}

#[test]
fn loads_toml_config() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".toml").tempfile().expect("temp config");
    let toml = r#"
checksum_type = "sha256"
plane_checksum = true

[frame]
format = "i420"
width = 176
height = 144
"#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");
    std::env::set_var("CHECKSUM_CONFIG", file.path());

    let cfg = ChecksumConfig::load().expect("load config");
    assert_eq!(cfg.settings.algorithm, ChecksumAlgorithm::Sha256);
    assert!(cfg.settings.plane_checksum);
    assert_eq!((cfg.geometry.width, cfg.geometry.height), (176, 144));

    clear_env();
}

#[test]
fn rejects_unknown_checksum_type_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("CHECKSUM_TYPE", "crc32");
    assert!(ChecksumConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_odd_frame_dimensions() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".json").tempfile().expect("temp config");
    let json = r#"{ "frame": { "width": 321, "height": 240 } }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    std::env::set_var("CHECKSUM_CONFIG", file.path());

    assert!(ChecksumConfig::load().is_err());

    clear_env();
}
