//! Media classification by file extension

use crate::config::Config;
use crate::error::{Error, Result};
use crate::os::FileStat;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Kind of media a file name denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    /// Videos, plus `mp3` which the default extension list files here
    Video,
    /// Not handled at all
    Other,
}

impl MediaKind {
    pub fn is_media(&self) -> bool {
        !matches!(self, MediaKind::Other)
    }
}

/// Extension lists, lowercased once
#[derive(Debug, Clone)]
pub struct MediaClassifier {
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
}

impl Default for MediaClassifier {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl MediaClassifier {
    pub fn new<I, V>(image_extensions: I, video_extensions: V) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let normalize = |ext: &str| ext.trim_start_matches('.').to_lowercase();
        Self {
            image_extensions: image_extensions
                .into_iter()
                .map(|e| normalize(e.as_ref()))
                .collect(),
            video_extensions: video_extensions
                .into_iter()
                .map(|e| normalize(e.as_ref()))
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.image_extensions, &config.video_extensions)
    }

    /// Classify a file name by its extension, ignoring case
    pub fn classify(&self, filename: &str) -> MediaKind {
        let Some(ext) = Path::new(filename).extension().and_then(|e| e.to_str()) else {
            return MediaKind::Other;
        };
        let ext = ext.to_lowercase();

        if self.image_extensions.iter().any(|e| *e == ext) {
            MediaKind::Image
        } else if self.video_extensions.iter().any(|e| *e == ext) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }
}

/// A media file discovered during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// File name only
    pub name: String,
    /// Full path at discovery time
    pub source_path: PathBuf,
    pub size: u64,
    pub created: Option<DateTime<Local>>,
    pub modified: DateTime<Local>,
    pub accessed: Option<DateTime<Local>>,
    /// Earlier of creation and modification time
    pub effective: DateTime<Local>,
    pub kind: MediaKind,
}

impl MediaFile {
    /// Build from a path whose kind is already known, reading its metadata
    pub fn from_path(path: &Path, kind: MediaKind) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidFileName {
                path: path.to_path_buf(),
            })?
            .to_string();

        let stat = FileStat::read(path).map_err(|source| Error::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_stat(name, path.to_path_buf(), stat, kind))
    }

    pub fn from_stat(name: String, source_path: PathBuf, stat: FileStat, kind: MediaKind) -> Self {
        Self {
            name,
            source_path,
            size: stat.size,
            created: stat.created,
            modified: stat.modified,
            accessed: stat.accessed,
            effective: stat.effective_timestamp(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_classify_images() {
        let classifier = MediaClassifier::default();
        for name in ["a.jpg", "b.JPEG", "c.Gif", "d.png", "IMG_0001.HEIC"] {
            assert_eq!(classifier.classify(name), MediaKind::Image, "{name}");
        }
    }

    #[test]
    fn test_classify_videos_includes_mp3() {
        let classifier = MediaClassifier::default();
        for name in ["song.mp3", "clip.MP4", "x.mov", "old.avi", "phone.3GP"] {
            assert_eq!(classifier.classify(name), MediaKind::Video, "{name}");
        }
    }

    #[test]
    fn test_classify_other() {
        let classifier = MediaClassifier::default();
        for name in ["notes.txt", "raw.cr2", "jpg", "archive.jpg.zip", ".DS_Store", "noext"] {
            assert_eq!(classifier.classify(name), MediaKind::Other, "{name}");
        }
        assert!(!MediaKind::Other.is_media());
    }

    #[test]
    fn test_classify_is_stable() {
        let classifier = MediaClassifier::default();
        let first = classifier.classify("Holiday.Jpg");
        for _ in 0..3 {
            assert_eq!(classifier.classify("Holiday.Jpg"), first);
        }
    }

    #[test]
    fn test_custom_extensions_normalized() {
        let classifier = MediaClassifier::new([".WEBP"], ["mkv"]);
        assert_eq!(classifier.classify("x.webp"), MediaKind::Image);
        assert_eq!(classifier.classify("x.MKV"), MediaKind::Video);
        assert_eq!(classifier.classify("x.jpg"), MediaKind::Other);
    }

    #[test]
    fn test_from_stat_uses_effective_timestamp() {
        let created = Local.with_ymd_and_hms(2021, 6, 15, 9, 0, 0).unwrap();
        let modified = Local.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap();
        let file = MediaFile::from_stat(
            "photo.jpg".into(),
            PathBuf::from("/src/photo.jpg"),
            FileStat {
                size: 1000,
                created: Some(created),
                modified,
                accessed: None,
            },
            MediaKind::Image,
        );
        assert_eq!(file.effective, created);
        assert_eq!(file.size, 1000);
    }
}
