// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, LassoFloat, LearnerState, RecordReader, RecordWriter, VectorRecord};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Numbered checkpoint files for the optimizer state.
///
/// Checkpoints are named `<directory>/<filebase>-NNNNN` with a zero-padded
/// five-digit sequence number. The current checkpoint is the one with the
/// largest sequence number; [`save`](`StateCheckpoint::save`) always writes
/// the next number, via a temporary file and an atomic rename, so
/// concurrent readers only ever observe complete checkpoints. The zero
/// padding makes lexicographic and numeric order agree, which lets external
/// tooling pick the current checkpoint with a plain directory sort.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateCheckpoint {
    directory: PathBuf,
    filebase: String,
}

impl StateCheckpoint {
    /// Checkpoints named `<directory>/<filebase>-NNNNN`.
    pub fn new<D: Into<PathBuf>, S: Into<String>>(directory: D, filebase: S) -> Self {
        StateCheckpoint {
            directory: directory.into(),
            filebase: filebase.into(),
        }
    }

    fn filename(&self, suffix: u32) -> PathBuf {
        self.directory
            .join(format!("{}-{:05}", self.filebase, suffix))
    }

    /// The sequence number of the most recent checkpoint, or `None` when
    /// the directory holds no checkpoint yet.
    pub fn latest_suffix(&self) -> Result<Option<u32>, Error> {
        if !self.directory.is_dir() {
            return Ok(None);
        }
        let prefix = format!("{}-", self.filebase);
        let mut latest = None;
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(suffix) = name.strip_prefix(&prefix) else {
                continue;
            };
            if let Ok(suffix) = suffix.parse::<u32>() {
                latest = latest.max(Some(suffix));
            }
        }
        Ok(latest)
    }

    /// The path of the most recent checkpoint, if any.
    pub fn latest(&self) -> Result<Option<PathBuf>, Error> {
        Ok(self.latest_suffix()?.map(|suffix| self.filename(suffix)))
    }

    /// Write `state` as the next checkpoint and return its path.
    pub fn save<P, F>(&self, state: &LearnerState<P, F>) -> Result<PathBuf, Error>
    where
        P: VectorRecord,
        F: LassoFloat,
    {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }
        let suffix = match self.latest_suffix()? {
            Some(current) => current + 1,
            None => 0,
        };
        let path = self.filename(suffix);
        let tmp = self.directory.join(format!("{}-{:05}.tmp", self.filebase, suffix));

        let mut writer = RecordWriter::new(BufWriter::new(File::create(&tmp)?));
        state.save_into_record_file(&mut writer)?;
        writer.flush()?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    /// Load the most recent checkpoint, or `None` when no checkpoint
    /// exists.
    pub fn load<P, F>(&self) -> Result<Option<LearnerState<P, F>>, Error>
    where
        P: VectorRecord,
        F: LassoFloat,
    {
        let Some(path) = self.latest()? else {
            return Ok(None);
        };
        let mut reader = RecordReader::new(BufReader::new(File::open(path)?));
        Ok(Some(LearnerState::load_from_record_file(&mut reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::{learner_state, sparse_vector};
    use lasso_math::SparseVector;

    fn checkpoint_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lasso-ckpt-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_numbering_starts_at_zero_and_increments() {
        let dir = checkpoint_dir("numbering");
        let _ = fs::remove_dir_all(&dir);
        let checkpoint = StateCheckpoint::new(&dir, "states");

        assert_eq!(checkpoint.latest().unwrap(), None);

        let state = learner_state(sparse_vector);
        let first = checkpoint.save(&state).unwrap();
        assert!(first.ends_with("states-00000"));
        let second = checkpoint.save(&state).unwrap();
        assert!(second.ends_with("states-00001"));
        assert_eq!(checkpoint.latest().unwrap(), Some(second));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unrelated_files_are_ignored() {
        let dir = checkpoint_dir("unrelated");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("states-garbage"), b"?").unwrap();
        fs::write(dir.join("other-00007"), b"?").unwrap();

        let checkpoint = StateCheckpoint::new(&dir, "states");
        assert_eq!(checkpoint.latest().unwrap(), None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = checkpoint_dir("roundtrip");
        let _ = fs::remove_dir_all(&dir);
        let checkpoint = StateCheckpoint::new(&dir, "states");

        let state = learner_state(sparse_vector);
        checkpoint.save(&state).unwrap();
        let loaded: LearnerState<SparseVector<f64>, f64> = checkpoint.load().unwrap().unwrap();
        assert_eq!(loaded, state);

        fs::remove_dir_all(&dir).unwrap();
    }
}
