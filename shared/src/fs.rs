use crate::KilnResult;
use std::path::{Path, PathBuf};

/// Reads a whole UTF-8 text file into memory.
pub async fn read_text<P: AsRef<Path>>(path: P) -> KilnResult<String> {
    Ok(fs_err::tokio::read_to_string(path.as_ref()).await?)
}

/// Writes `text` to `path`, replacing whatever the file held before.
pub async fn write_text<P: AsRef<Path>>(path: P, text: &str) -> KilnResult {
    fs_err::tokio::write(path.as_ref(), text.as_bytes()).await?;
    Ok(())
}

/// Canonicalizes `path`, dropping the `\\?\` verbatim prefix Windows adds so
/// the result can be compared against user-supplied paths.
pub fn canonicalize_with_strip<P: AsRef<Path>>(path: P) -> KilnResult<PathBuf> {
    let canonical = fs_err::canonicalize(path.as_ref())?;

    #[cfg(windows)]
    {
        let raw = canonical.to_string_lossy();
        if let Some(stripped) = raw.strip_prefix(r"\\?\") {
            return Ok(PathBuf::from(stripped));
        }
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_text_overwrites_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");

        write_text(&file, "<p>a much longer first version</p>").await.unwrap();
        write_text(&file, "<p>b</p>").await.unwrap();

        assert_eq!(read_text(&file).await.unwrap(), "<p>b</p>");
    }

    #[tokio::test]
    async fn read_text_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(dir.path().join("nope.html")).await.unwrap_err();

        match err {
            crate::KilnError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn canonicalize_resolves_relative_segments() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::create_dir(dir.path().join("src")).unwrap();

        let resolved = canonicalize_with_strip(dir.path().join("src").join("..")).unwrap();

        assert_eq!(resolved, canonicalize_with_strip(dir.path()).unwrap());
    }
}
