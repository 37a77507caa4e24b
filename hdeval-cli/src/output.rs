//! Output files of an evaluation run.

use hdeval::stats::report::{self, Delimiter};
use hdeval::{Comparison, HdEvalError, HdEvalResult, ScoreSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

fn write_error(path: &Path, err: io::Error) -> HdEvalError {
    HdEvalError::OutputWrite {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

struct ScoreFile {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ScoreFile {
    fn create(path: &Path) -> HdEvalResult<Self> {
        let file = File::create(path).map_err(|e| write_error(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }
}

/// Writes genuine and impostor scores to separate files, one per line.
pub struct ScoreFiles {
    genuine: ScoreFile,
    impostor: ScoreFile,
    delimiter: Delimiter,
    labels: bool,
}

impl ScoreFiles {
    pub fn create(
        genuine: &Path,
        impostor: &Path,
        delimiter: Delimiter,
        labels: bool,
    ) -> HdEvalResult<Self> {
        Ok(Self {
            genuine: ScoreFile::create(genuine)?,
            impostor: ScoreFile::create(impostor)?,
            delimiter,
            labels,
        })
    }

    /// Flushes both files.
    pub fn finish(mut self) -> HdEvalResult<()> {
        for file in [&mut self.genuine, &mut self.impostor] {
            file.out.flush().map_err(|e| write_error(&file.path, e))?;
        }
        Ok(())
    }
}

impl ScoreSink for ScoreFiles {
    fn accept(&mut self, comparison: &Comparison<'_>) -> HdEvalResult<()> {
        let file = if comparison.genuine {
            &mut self.genuine
        } else {
            &mut self.impostor
        };
        let sample = comparison.sample.to_string_lossy();
        let reference = comparison.reference.to_string_lossy();
        let labels = self.labels.then_some((&*sample, &*reference));
        report::write_score(&mut file.out, self.delimiter, labels, comparison.score)
            .map_err(|e| write_error(&file.path, e))
    }
}

/// Creates `path` and fills it through `write`.
pub fn write_report<F>(path: &Path, write: F) -> HdEvalResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|()| out.flush())
        .map_err(|e| write_error(path, e))
}
