use std::path::Path;

/// Extracts the file extension from a filename and converts it to lowercase.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("clip.Mp4"), Some("mp4".to_string()));
    }

    #[test]
    fn last_extension_wins() {
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
    }

    #[test]
    fn missing_extension_is_none() {
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(""), None);
    }
}
