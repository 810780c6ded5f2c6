use std::io;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

/// Templates, assets and sample content packed by the build script.
const RES_ARCHIVE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/res.tar.gz"));

pub fn decompress_files(output: &Path) -> io::Result<()> {
    let tar = GzDecoder::new(RES_ARCHIVE);
    let mut archive = Archive::new(tar);
    archive.unpack(output)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_uncompress() {
        let out_path = std::env::temp_dir().join(format!("folio-decompress-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&out_path).unwrap();
        decompress_files(&out_path).unwrap();
        assert!(out_path.join("template").join("layout.tpl").is_file());
        assert!(out_path.join("taxonomy.toml").is_file());
        fs::remove_dir_all(out_path).unwrap();
    }
}
