//! Decoding of samples and references with their companion files.

use crate::align::{ShiftRange, ShiftSource};
use crate::code::{BitMask, BitTemplate, ByteWindow, CodeLoader};
use crate::eval::{EvalConfig, PathResolver, ShiftMode};
use crate::util::{HdEvalError, HdEvalResult};
use std::path::{Path, PathBuf};

/// A decoded sample, reused across all of its comparisons.
pub(crate) struct LoadedSample {
    codes: Vec<BitTemplate>,
    masks: Option<Vec<BitMask>>,
    range: Option<ShiftRange>,
    window: ByteWindow,
}

impl LoadedSample {
    pub(crate) fn dims(&self) -> (usize, usize) {
        self.codes[0].dims()
    }

    pub(crate) fn window(&self) -> ByteWindow {
        self.window
    }

    pub(crate) fn source(&self) -> ShiftSource<'_> {
        match self.range {
            Some(range) => ShiftSource::Range {
                code: &self.codes[0],
                mask: self.masks.as_ref().map(|m| &m[0]),
                range,
            },
            None => ShiftSource::Precomputed {
                codes: &self.codes,
                masks: self.masks.as_deref(),
            },
        }
    }
}

/// Resolves companion files and decodes codes for one run configuration.
pub(crate) struct SampleLoader<'a, L: ?Sized, R: ?Sized> {
    pub(crate) config: &'a EvalConfig,
    pub(crate) loader: &'a L,
    pub(crate) resolver: &'a R,
}

impl<'a, L, R> SampleLoader<'a, L, R>
where
    L: CodeLoader + ?Sized,
    R: PathResolver + ?Sized,
{
    fn rename(&self, path: &Path, rule: &str) -> HdEvalResult<PathBuf> {
        self.resolver
            .rename(&self.config.input_pattern, path, rule, '?')
            .map(PathBuf::from)
    }

    /// Decodes `path` as a sample: its code (or shifted variants) and masks.
    pub(crate) fn load_sample(&self, path: &Path) -> HdEvalResult<LoadedSample> {
        let mask_rule = self.config.masks.as_ref().map(|m| m.sample.as_str());
        let (codes, masks, range) = match &self.config.shifts {
            ShiftMode::Range(range) => {
                let code = self.loader.load(path)?;
                let masks = match mask_rule {
                    Some(rule) => Some(vec![self.loader.load(&self.rename(path, rule)?)?]),
                    None => None,
                };
                (vec![code], masks, Some(*range))
            }
            ShiftMode::Precomputed { rule } => {
                let variant_pattern = self
                    .resolver
                    .rename(&self.config.input_pattern, path, rule, '?')?;
                let variants = self.resolver.expand(&variant_pattern)?;
                if variants.is_empty() {
                    return Err(HdEvalError::NoInputFiles {
                        pattern: variant_pattern,
                    });
                }
                let variant_mask_rule = match mask_rule {
                    Some(rule) => Some(
                        self.resolver
                            .rename(&self.config.input_pattern, path, rule, '?')?,
                    ),
                    None => None,
                };
                let mut codes = Vec::with_capacity(variants.len());
                let mut masks = variant_mask_rule.as_ref().map(|_| Vec::new());
                for variant in &variants {
                    codes.push(self.loader.load(variant)?);
                    if let (Some(rule), Some(masks)) = (&variant_mask_rule, masks.as_mut()) {
                        let mask_path =
                            self.resolver
                                .rename(&variant_pattern, variant, rule, '!')?;
                        masks.push(self.loader.load(Path::new(&mask_path))?);
                    }
                }
                (codes, masks, None)
            }
        };

        let dims = codes[0].dims();
        for code in &codes[1..] {
            check_dims(code, dims, "shifted sample code")?;
        }
        for mask in masks.iter().flatten() {
            check_dims(mask, dims, "sample mask")?;
        }
        let window = ByteWindow::for_interval(self.config.bits, codes[0].byte_len())?;
        Ok(LoadedSample {
            codes,
            masks,
            range,
            window,
        })
    }

    /// Decodes a reference code and its mask, checked against `dims`.
    pub(crate) fn load_reference(
        &self,
        path: &Path,
        dims: (usize, usize),
    ) -> HdEvalResult<(BitTemplate, Option<BitMask>)> {
        let code = self.loader.load(path)?;
        check_dims(&code, dims, "reference code")?;
        let mask = match &self.config.masks {
            Some(rules) => {
                let mask = self.loader.load(&self.rename(path, rules.reference_rule())?)?;
                check_dims(&mask, dims, "reference mask")?;
                Some(mask)
            }
            None => None,
        };
        Ok((code, mask))
    }
}

fn check_dims(code: &BitTemplate, expected: (usize, usize), context: &'static str) -> HdEvalResult<()> {
    if code.dims() != expected {
        return Err(HdEvalError::DimensionMismatch {
            context,
            expected,
            got: code.dims(),
        });
    }
    Ok(())
}
