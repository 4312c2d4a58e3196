use url::Url;

/// Returns the lowercased extension of the URL's last path segment
///
/// The extension is whatever follows the last `.` of the final segment.
/// Segments without a dot (or ending in one) have no extension.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webharvest::url::file_extension;
///
/// let url = Url::parse("https://a.test/files/Report.PDF?v=2").unwrap();
/// assert_eq!(file_extension(&url), Some("pdf".to_string()));
/// ```
pub fn file_extension(url: &Url) -> Option<String> {
    let name = last_segment(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Returns the URL's last non-empty path segment, used as a document filename
pub fn file_name(url: &Url) -> Option<String> {
    last_segment(url).map(|s| s.to_string())
}

fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extension_lowercased() {
        assert_eq!(file_extension(&url("https://a.test/x.DOCX")), Some("docx".into()));
    }

    #[test]
    fn test_extension_ignores_query() {
        assert_eq!(
            file_extension(&url("https://a.test/report.pdf?download=1")),
            Some("pdf".into())
        );
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(file_extension(&url("https://a.test/")), None);
        assert_eq!(file_extension(&url("https://a.test/about")), None);
        assert_eq!(file_extension(&url("https://a.test/.hidden")), None);
        assert_eq!(file_extension(&url("https://a.test/trailing.")), None);
    }

    #[test]
    fn test_extension_of_directory_like_path() {
        assert_eq!(
            file_extension(&url("https://a.test/archive.tar.gz/")),
            Some("gz".into())
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(&url("https://a.test/docs/manual.pdf")),
            Some("manual.pdf".into())
        );
        assert_eq!(file_name(&url("https://a.test/")), None);
    }
}
