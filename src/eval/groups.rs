//! Grouping of template files by user.

use crate::eval::PathResolver;
use crate::util::{HdEvalError, HdEvalResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Templates of every user, users in sorted order, templates in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserTemplateGroup {
    users: BTreeMap<String, Vec<PathBuf>>,
}

impl UserTemplateGroup {
    /// Groups `files` by the user identifier `user_of` derives for each.
    pub fn from_files<I, F>(files: I, mut user_of: F) -> HdEvalResult<Self>
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnMut(&Path) -> HdEvalResult<String>,
    {
        let mut users: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for file in files {
            let user = user_of(&file)?;
            users.entry(user).or_default().push(file);
        }
        Ok(Self { users })
    }

    /// Expands `pattern` and derives each file's user through `class_rule`.
    ///
    /// Fails with `NoInputFiles` when the pattern matches nothing.
    pub fn discover<R: PathResolver + ?Sized>(
        resolver: &R,
        pattern: &str,
        class_rule: &str,
    ) -> HdEvalResult<Self> {
        let files = resolver.expand(pattern)?;
        if files.is_empty() {
            return Err(HdEvalError::NoInputFiles {
                pattern: pattern.to_string(),
            });
        }
        Self::from_files(files, |path| resolver.rename(pattern, path, class_rule, '?'))
    }

    /// Number of users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of templates over all users.
    pub fn template_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }

    /// Iterates `(user, templates)` in user order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> + '_ {
        self.users
            .iter()
            .map(|(user, files)| (user.as_str(), files.as_slice()))
    }
}
