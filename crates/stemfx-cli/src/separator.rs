use std::path::{Path, PathBuf};

use stemfx_rack::{AudioBuffer, SeparationError, SourceSeparator, StemMap, StemName};
use tracing::{debug, warn};

use crate::audio_io;

/// Reads stems some external tool already wrote as `<dir>/<stem>.wav`.
///
/// Stems without a file are left out of the mapping, as are files that
/// cannot be read or whose shape differs from the mix.
#[derive(Debug, Clone)]
pub struct StemDirectorySeparator {
    dir: PathBuf,
}

impl StemDirectorySeparator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SourceSeparator for StemDirectorySeparator {
    fn name(&self) -> &str {
        "stem-directory"
    }

    fn separate(&self, mix: &AudioBuffer, sample_rate: u32) -> Result<StemMap, SeparationError> {
        if !self.dir.is_dir() {
            return Err(SeparationError::backend(format!(
                "stem directory {} does not exist",
                self.dir.display()
            )));
        }
        let mut stems = StemMap::new();
        for stem in StemName::ALL {
            let path = self.dir.join(format!("{stem}.wav"));
            if !path.is_file() {
                debug!(%stem, "no stem file");
                continue;
            }
            let decoded = match audio_io::load_resampled(&path, sample_rate) {
                Ok(decoded) => decoded,
                Err(err) => {
                    let message = format!("{err:#}");
                    warn!(
                        %stem,
                        path = %path.display(),
                        error = %message,
                        "unreadable stem file skipped"
                    );
                    continue;
                }
            };
            if decoded.buffer.shape() != mix.shape() {
                warn!(
                    %stem,
                    expected = ?mix.shape(),
                    actual = ?decoded.buffer.shape(),
                    "stem shape differs from the mix, skipped"
                );
                continue;
            }
            stems.insert(stem, decoded.buffer);
        }
        Ok(stems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_only_present_stems() {
        let dir = tempfile::tempdir().unwrap();
        let mix = AudioBuffer::from_channels(vec![vec![0.2; 64], vec![0.1; 64]]).unwrap();
        audio_io::save(&mix, &dir.path().join("bass.wav"), 44_100).unwrap();

        let stems = StemDirectorySeparator::new(dir.path())
            .separate(&mix, 44_100)
            .unwrap();
        assert_eq!(stems.keys().copied().collect::<Vec<_>>(), vec![StemName::Bass]);
        assert_eq!(stems[&StemName::Bass], mix);
    }

    #[test]
    fn missing_directory_is_a_backend_error() {
        let mix = AudioBuffer::new(1, 8);
        let err = StemDirectorySeparator::new("/no/such/stems")
            .separate(&mix, 44_100)
            .unwrap_err();
        assert!(matches!(err, SeparationError::Backend { .. }));
    }

    #[test]
    fn mismatched_stem_is_skipped_and_the_rest_kept() {
        let dir = tempfile::tempdir().unwrap();
        let mix = AudioBuffer::from_channels(vec![vec![0.1; 64]]).unwrap();
        let short = AudioBuffer::from_channels(vec![vec![0.2; 32]]).unwrap();
        audio_io::save(&short, &dir.path().join("vocals.wav"), 44_100).unwrap();
        audio_io::save(&mix, &dir.path().join("bass.wav"), 44_100).unwrap();

        let stems = StemDirectorySeparator::new(dir.path())
            .separate(&mix, 44_100)
            .unwrap();
        assert!(!stems.contains_key(&StemName::Vocals));
        assert_eq!(stems[&StemName::Bass], mix);
    }

    #[test]
    fn unreadable_stem_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("guitar.wav"), b"not a wav file").unwrap();
        let mix = AudioBuffer::new(1, 8);
        let stems = StemDirectorySeparator::new(dir.path())
            .separate(&mix, 44_100)
            .unwrap();
        assert!(stems.is_empty());
    }
}
