use anyhow::Context;
use flate2::read::GzDecoder;
use log::info;
use std::{fs::File, io::Read, path::Path};

/// Reads a whole text file, transparently decompressing `.gz` files.
pub(crate) fn read_text(path: &Path) -> anyhow::Result<String> {
    info!(target: "input", "reading '{}'", path.display());
    let mut file =
        File::open(path).with_context(|| format!("failed to open file '{}'", path.display()))?;
    let size = file.metadata().map(|data| data.len()).unwrap_or_default();
    let mut buf = String::new();
    // Reserve enough bytes in buf to avoid reallocation.
    buf.reserve(size as usize);
    if path.extension().and_then(|ext| ext.to_str()) == Some("gz") {
        GzDecoder::new(file)
            .read_to_string(&mut buf)
            .with_context(|| format!("failed to decompress file '{}'", path.display()))?;
    } else {
        file.read_to_string(&mut buf)
            .with_context(|| format!("failed to read file '{}' to string", path.display()))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::Write;

    #[test]
    fn plain_and_gzip() {
        let dir = std::env::temp_dir().join(format!("spinsight-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let plain = dir.join("run.trail");
        std::fs::write(&plain, "1:0:20\n").expect("write");
        assert_eq!(read_text(&plain).expect("read"), "1:0:20\n");

        let gzip = dir.join("run.trail.gz");
        let mut encoder = GzEncoder::new(File::create(&gzip).expect("create"), Compression::default());
        encoder.write_all(b"1:0:20\n").expect("compress");
        encoder.finish().expect("finish");
        assert_eq!(read_text(&gzip).expect("read"), "1:0:20\n");

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn missing_file() {
        let error = read_text(Path::new("./no/such/file.out")).expect_err("missing");
        assert!(error.to_string().contains("no/such/file.out"));
    }
}
