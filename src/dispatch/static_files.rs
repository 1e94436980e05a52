//! Static file lookup under a site root.

use std::path::{Component, Path, PathBuf};

/// Maps request file paths onto a directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `file_path` onto the root. Parent, root and prefix components
    /// are refused so a request can never escape the root.
    fn map_path(&self, file_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        let mut pushed = false;
        for component in Path::new(file_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => {
                    path.push(segment);
                    pushed = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        pushed.then_some(path)
    }

    /// The file for `file_path`, if it exists and is a regular file.
    pub fn resolve(&self, file_path: &str) -> Option<PathBuf> {
        let path = self.map_path(file_path)?;
        path.is_file().then_some(path)
    }

    /// Content type by file extension. Text types are served as UTF-8.
    pub fn content_type(path: &Path) -> String {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() == mime_guess::mime::TEXT && mime.get_param(mime_guess::mime::CHARSET).is_none() {
            format!("{}; charset=utf-8", mime)
        } else {
            mime.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_map_path_prevents_traversal() {
        let sf = StaticFiles::new("/srv/site");
        assert!(sf.map_path("../Cargo.toml").is_none());
        assert!(sf.map_path("css/../../etc/passwd").is_none());
        assert_eq!(sf.map_path("css/site.css"), Some(PathBuf::from("/srv/site/css/site.css")));
        assert_eq!(sf.map_path("/./a.txt"), Some(PathBuf::from("/srv/site/a.txt")));
    }

    #[test]
    fn test_empty_path_maps_to_nothing() {
        let sf = StaticFiles::new("/srv/site");
        assert!(sf.map_path("").is_none());
        assert!(sf.map_path("/").is_none());
    }

    #[test]
    fn test_resolve_only_regular_files() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("css")).unwrap();
        fs::write(root.path().join("css/site.css"), "body{}").unwrap();

        let sf = StaticFiles::new(root.path());
        assert_eq!(sf.resolve("css/site.css"), Some(root.path().join("css/site.css")));
        assert!(sf.resolve("css").is_none());
        assert!(sf.resolve("css/missing.css").is_none());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(StaticFiles::content_type(Path::new("a.HTML")), "text/html; charset=utf-8");
        assert_eq!(StaticFiles::content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(StaticFiles::content_type(Path::new("logo.png")), "image/png");
        assert_eq!(StaticFiles::content_type(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(StaticFiles::content_type(Path::new("a")), "application/octet-stream");
    }
}
