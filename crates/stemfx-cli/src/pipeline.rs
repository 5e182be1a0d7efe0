use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use stemfx_rack::{
    select_stem, AudioBuffer, InstrumentFamily, Rack, SourceSeparator, StemMap, StemName,
};
use tracing::{debug, error, info, warn};

use crate::audio_io;
use crate::config::RackConfigFile;
use crate::CANONICAL_SAMPLE_RATE;

/// What one family's pass over a file produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StemOutput {
    pub family: InstrumentFamily,
    pub stem: StemName,
    /// The mix was used because the separator did not provide this stem.
    pub from_mix: bool,
    pub separated: PathBuf,
    pub processed: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StemFailure {
    pub family: InstrumentFamily,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub outputs: Vec<StemOutput>,
    pub failures: Vec<StemFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Separates a mix and runs each requested family's stem through its rack.
pub struct Pipeline<'a> {
    separator: &'a dyn SourceSeparator,
    config: RackConfigFile,
    families: Vec<InstrumentFamily>,
    seed: Option<u64>,
}

impl<'a> Pipeline<'a> {
    pub fn new(separator: &'a dyn SourceSeparator, config: RackConfigFile) -> Self {
        Self {
            separator,
            config,
            families: InstrumentFamily::ALL.to_vec(),
            seed: None,
        }
    }

    pub fn with_families(mut self, families: Vec<InstrumentFamily>) -> Self {
        self.families = families;
        self
    }

    /// Randomizes every rack with `seed` before processing.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Writes `<out>/separated/<stem>.wav` and
    /// `<out>/processed/<stem>_processed.wav` for each family.
    ///
    /// Only failures that affect the whole file are returned as errors; a
    /// failing family is recorded in the report and the others continue.
    pub fn process_file(&self, input: &Path, out_dir: &Path) -> Result<FileReport> {
        info!(input = %input.display(), "processing");
        let mix = audio_io::load_resampled(input, CANONICAL_SAMPLE_RATE)
            .with_context(|| format!("failed to load {}", input.display()))?
            .buffer;

        let separated_dir = out_dir.join("separated");
        let processed_dir = out_dir.join("processed");
        for dir in [&separated_dir, &processed_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let stems = match self.separator.separate(&mix, CANONICAL_SAMPLE_RATE) {
            Ok(stems) => stems,
            Err(err) => {
                warn!(
                    separator = self.separator.name(),
                    %err,
                    "separation failed, using the mix for every stem"
                );
                StemMap::new()
            }
        };

        let mut report = FileReport {
            input: input.to_path_buf(),
            ..FileReport::default()
        };
        for &family in &self.families {
            match self.process_stem(family, &mix, &stems, &separated_dir, &processed_dir) {
                Ok(output) => report.outputs.push(output),
                Err(err) => {
                    let message = format!("{err:#}");
                    error!(%family, error = %message, "stem failed");
                    report.failures.push(StemFailure {
                        family,
                        error: message,
                    });
                }
            }
        }
        Ok(report)
    }

    fn process_stem(
        &self,
        family: InstrumentFamily,
        mix: &AudioBuffer,
        stems: &StemMap,
        separated_dir: &Path,
        processed_dir: &Path,
    ) -> Result<StemOutput> {
        let stem = family.stem();
        let (source, from_mix) = match select_stem(stems, stem) {
            Some(buffer) => (buffer, false),
            None => {
                warn!(%stem, "stem missing, falling back to the mix");
                (mix, true)
            }
        };

        let separated = separated_dir.join(format!("{stem}.wav"));
        audio_io::save(source, &separated, CANONICAL_SAMPLE_RATE)
            .with_context(|| format!("failed to write {}", separated.display()))?;

        let rack_config = self.config.rack(family);
        let preset = self.config.preset(family);
        let mut rack = Rack::with_overrides(family, &preset, rack_config.overrides())
            .with_context(|| format!("failed to build the {family} rack"))?;
        if self.seed.is_some() {
            rack.randomize_parameters(self.seed)?;
        }
        let processed_buffer = rack.process_buffer(source, CANONICAL_SAMPLE_RATE)?;

        let processed = processed_dir.join(format!("{stem}_processed.wav"));
        audio_io::save(&processed_buffer, &processed, CANONICAL_SAMPLE_RATE)
            .with_context(|| format!("failed to write {}", processed.display()))?;
        info!(
            %family,
            %stem,
            %preset,
            stages = rack.chain().map_or(0, |chain| chain.len()),
            "wrote stem"
        );

        Ok(StemOutput {
            family,
            stem,
            from_mix,
            separated,
            processed,
        })
    }

    /// Processes `inputs` one after another into `<out>/<file stem>/`. A file
    /// that fails is logged and skipped.
    ///
    /// Repeated file stems get a numeric suffix (`song`, `song-2`, ..) so no
    /// input overwrites another's output.
    pub fn process_batch(&self, inputs: &[PathBuf], out_dir: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        let mut used = HashSet::new();
        for input in inputs {
            let stem = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".to_string());
            let name = unique_name(&stem, &mut used);
            if name != stem {
                debug!(input = %input.display(), %name, "renamed output directory");
            }
            match self.process_file(input, &out_dir.join(name)) {
                Ok(file) => report.files.push(file),
                Err(err) => {
                    let message = format!("{err:#}");
                    error!(input = %input.display(), error = %message, "file failed");
                    report.failed.push((input.clone(), message));
                }
            }
        }
        report
    }
}

fn unique_name(stem: &str, used: &mut HashSet<String>) -> String {
    let mut name = stem.to_string();
    let mut suffix = 2;
    while used.contains(&name) {
        name = format!("{stem}-{suffix}");
        suffix += 1;
    }
    used.insert(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_suffixes_repeats() {
        let mut used = HashSet::new();
        let names: Vec<String> = ["song", "song", "intro", "song", "song-2"]
            .into_iter()
            .map(|stem| unique_name(stem, &mut used))
            .collect();
        assert_eq!(names, ["song", "song-2", "intro", "song-3", "song-2-2"]);
    }
}
