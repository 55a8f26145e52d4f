//! Filtered breadth-first tree walk.
//!
//! `SuperPath::find()` returns a [`Find`] builder; iterating it walks the tree
//! lazily with a FIFO frontier, so every sibling at one level is queued before
//! any of their children. Each iteration of a `Find` starts a fresh walk.

use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io;
use tracing::{trace, warn};

use crate::path::SuperPath;

type Predicate<'a> = Box<dyn Fn(&SuperPath) -> bool + 'a>;

pub struct Find<'a> {
    root: SuperPath,
    condition: Option<Predicate<'a>>,
    exclude: Option<Predicate<'a>>,
    recurse_on_match: bool,
    follow_symlinks: bool,
    only_folders: bool,
}

impl fmt::Debug for Find<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Find")
            .field("root", &self.root)
            .field("has_condition", &self.condition.is_some())
            .field("has_exclude", &self.exclude.is_some())
            .field("recurse_on_match", &self.recurse_on_match)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("only_folders", &self.only_folders)
            .finish()
    }
}

impl SuperPath {
    /// Walk everything under (and including) this path. Without a
    /// [`Find::condition`] every reachable path is yielded.
    pub fn find<'a>(&self) -> Find<'a> {
        Find {
            root: self.clone(),
            condition: None,
            exclude: None,
            recurse_on_match: false,
            follow_symlinks: false,
            only_folders: false,
        }
    }
}

impl<'a> Find<'a> {
    /// Yield only paths for which `f` is true.
    pub fn condition(mut self, f: impl Fn(&SuperPath) -> bool + 'a) -> Self {
        self.condition = Some(Box::new(f));
        self
    }

    /// Skip paths for which `f` is true, together with everything below them.
    pub fn exclude(mut self, f: impl Fn(&SuperPath) -> bool + 'a) -> Self {
        self.exclude = Some(Box::new(f));
        self
    }

    /// Keep descending into directories that matched. Forced on when no
    /// condition is set.
    pub fn recurse_on_match(mut self, yes: bool) -> Self {
        self.recurse_on_match = yes;
        self
    }

    pub fn follow_symlinks(mut self, yes: bool) -> Self {
        self.follow_symlinks = yes;
        self
    }

    /// Only consider directories. Files are never stat'ed, never yielded.
    pub fn only_folders(mut self, yes: bool) -> Self {
        self.only_folders = yes;
        self
    }

    /// Walk with a fresh frontier.
    pub fn iter(&self) -> FindIter<'_, 'a> {
        let mut frontier = VecDeque::new();
        let seed = if self.only_folders {
            self.root.is_dir()
        } else {
            self.root.exists()
        };
        if seed {
            frontier.push_back(self.root.clone());
        }
        FindIter {
            find: self,
            frontier,
            deferred: None,
        }
    }

    fn matches(&self, path: &SuperPath) -> bool {
        self.condition.as_ref().is_none_or(|c| c(path))
    }

    fn excluded(&self, path: &SuperPath) -> bool {
        self.exclude.as_ref().is_some_and(|e| e(path))
    }

    fn should_recurse(&self, matched: bool) -> bool {
        self.condition.is_none() || self.recurse_on_match || !matched
    }

    /// Immediate children admitted by the symlink/folder policy, in name order.
    fn admitted_children(&self, dir: &SuperPath) -> Vec<SuperPath> {
        let entries = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => {
                log_listing_error(dir, &e);
                return Vec::new();
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log_listing_error(dir, &e);
                    continue;
                }
            };
            let path = SuperPath::from(entry.path());
            let Ok(ft) = entry.file_type() else {
                continue;
            };
            if ft.is_symlink() && !self.follow_symlinks {
                continue;
            }
            if self.only_folders {
                let is_dir = if ft.is_symlink() { path.is_dir() } else { ft.is_dir() };
                if !is_dir {
                    continue;
                }
            }
            children.push(path);
        }
        children.sort();
        children
    }
}

fn log_listing_error(dir: &SuperPath, e: &io::Error) {
    match e.kind() {
        io::ErrorKind::PermissionDenied
        | io::ErrorKind::NotFound
        | io::ErrorKind::NotADirectory => {
            trace!(dir = %dir, error = %e, "find: skipping unlistable entry");
        }
        _ => {
            warn!(dir = %dir, error = %e, "find: cannot list directory; skipping subtree");
        }
    }
}

/// Lazy iterator over a [`Find`] walk.
pub struct FindIter<'f, 'a> {
    find: &'f Find<'a>,
    frontier: VecDeque<SuperPath>,
    /// Last yielded directory; listed on the following `next` call.
    deferred: Option<SuperPath>,
}

impl Iterator for FindIter<'_, '_> {
    type Item = SuperPath;

    fn next(&mut self) -> Option<SuperPath> {
        if let Some(dir) = self.deferred.take() {
            self.frontier.extend(self.find.admitted_children(&dir));
        }
        while let Some(path) = self.frontier.pop_front() {
            if self.find.excluded(&path) {
                continue;
            }
            let matched = self.find.matches(&path);
            let expandable = self.find.only_folders || path.is_dir();
            let recurse = self.find.should_recurse(matched) && expandable;
            if matched {
                if recurse {
                    self.deferred = Some(path.clone());
                }
                return Some(path);
            }
            if recurse {
                self.frontier.extend(self.find.admitted_children(&path));
            }
        }
        None
    }
}

impl<'f, 'a> IntoIterator for &'f Find<'a> {
    type Item = SuperPath;
    type IntoIter = FindIter<'f, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning walk, for `for p in path.find().condition(..)` chains.
pub struct FindIntoIter<'a> {
    find: Find<'a>,
    frontier: VecDeque<SuperPath>,
    deferred: Option<SuperPath>,
}

impl<'a> IntoIterator for Find<'a> {
    type Item = SuperPath;
    type IntoIter = FindIntoIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        let frontier = self.iter().frontier;
        FindIntoIter {
            find: self,
            frontier,
            deferred: None,
        }
    }
}

impl Iterator for FindIntoIter<'_> {
    type Item = SuperPath;

    fn next(&mut self) -> Option<SuperPath> {
        let mut walk = FindIter {
            find: &self.find,
            frontier: std::mem::take(&mut self.frontier),
            deferred: self.deferred.take(),
        };
        let item = walk.next();
        self.frontier = walk.frontier;
        self.deferred = walk.deferred;
        item
    }
}
