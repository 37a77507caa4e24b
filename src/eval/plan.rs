//! Enumeration of genuine and impostor comparison pairs.

use crate::eval::groups::UserTemplateGroup;
use std::path::{Path, PathBuf};

/// Which pairs of templates are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnumerationPolicy {
    /// Every unordered pair once: same user is genuine, otherwise impostor.
    #[default]
    AllPairs,
    /// All genuine pairs, but impostor pairs only between users' first
    /// templates, so prolific users do not dominate the impostor population.
    Balanced,
}

/// Reference template compared against a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reference<'g> {
    pub path: &'g Path,
    pub genuine: bool,
}

/// A sample and, in order, every reference it is compared against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleTask<'g> {
    pub sample: &'g Path,
    pub references: Vec<Reference<'g>>,
}

/// Expected comparison counts of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PairCounts {
    pub genuine: u64,
    pub impostor: u64,
}

impl PairCounts {
    /// Genuine plus impostor comparisons.
    pub fn total(&self) -> u64 {
        self.genuine + self.impostor
    }
}

fn pairs(n: u64) -> u64 {
    n * n.saturating_sub(1) / 2
}

/// Counts the comparisons `policy` performs on `group` without listing them.
pub fn planned_counts(group: &UserTemplateGroup, policy: EnumerationPolicy) -> PairCounts {
    let genuine = group.iter().map(|(_, files)| pairs(files.len() as u64)).sum();
    let impostor = match policy {
        EnumerationPolicy::AllPairs => pairs(group.template_count() as u64) - genuine,
        EnumerationPolicy::Balanced => pairs(group.user_count() as u64),
    };
    PairCounts { genuine, impostor }
}

/// Lists the comparisons of a run, grouped by sample.
///
/// Samples appear in user order and, within a user, in template order.
/// Each sample's genuine references (later templates of the same user) come
/// before its impostor references (templates of later users). Samples with
/// nothing to compare are omitted.
pub fn enumerate_pairs(group: &UserTemplateGroup, policy: EnumerationPolicy) -> Vec<SampleTask<'_>> {
    let users: Vec<&[PathBuf]> = group.iter().map(|(_, files)| files).collect();
    let mut tasks = Vec::with_capacity(group.template_count());
    for (u, &files) in users.iter().enumerate() {
        let later_users = &users[u + 1..];
        for (i, sample) in files.iter().enumerate() {
            let mut references: Vec<Reference<'_>> = files[i + 1..]
                .iter()
                .map(|path| Reference {
                    path,
                    genuine: true,
                })
                .collect();
            match policy {
                EnumerationPolicy::AllPairs => {
                    references.extend(later_users.iter().flat_map(|&other| {
                        other.iter().map(|path| Reference {
                            path,
                            genuine: false,
                        })
                    }));
                }
                EnumerationPolicy::Balanced if i == 0 => {
                    references.extend(later_users.iter().filter_map(|&other| {
                        other.first().map(|path| Reference {
                            path,
                            genuine: false,
                        })
                    }));
                }
                EnumerationPolicy::Balanced => {}
            }
            if !references.is_empty() {
                tasks.push(SampleTask {
                    sample,
                    references,
                });
            }
        }
    }
    tasks
}
