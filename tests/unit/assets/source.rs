use super::*;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(
        normalize_rel_path("teeth-image/18.png").unwrap(),
        "teeth-image/18.png"
    );
    assert_eq!(
        normalize_rel_path("teeth-image\\18.png").unwrap(),
        "teeth-image/18.png"
    );
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn memory_source_returns_registered_bytes() {
    let src = MemoryImageSource::new().with("a.png", vec![1, 2, 3]);
    assert_eq!(src.load("a.png").unwrap(), vec![1, 2, 3]);
    assert!(src.load("b.png").is_err());
}

#[test]
fn fs_source_reads_relative_files() {
    let tmp = std::env::temp_dir().join(format!(
        "toothsketch_fs_source_test_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(tmp.join("teeth-image")).unwrap();
    std::fs::write(tmp.join("teeth-image").join("11.png"), b"abc").unwrap();

    let src = FsImageSource::new(&tmp);
    assert_eq!(src.load("teeth-image/11.png").unwrap(), b"abc".to_vec());
    assert!(src.load("teeth-image/12.png").is_err());
    assert!(src.load("../etc/passwd").is_err());

    std::fs::remove_dir_all(&tmp).ok();
}
