//! Classpath index and reference resolver (§4.8).
//!
//! Builds a `fqcn -> source` map from an ordered list of jars and
//! directories (first writer wins, i.e. classpath precedence, §8 property 7)
//! and resolves a set of unresolved `RefClass` symbols against it, grouped
//! by package as `jldd` needs (§6).

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive::Archive;
use crate::errors::JvmError;

/// `fqcn -> absolute path of the jar or directory that supplies it`.
#[derive(Debug, Clone, Default)]
pub struct ClasspathIndex {
    sources: BTreeMap<String, PathBuf>,
}

impl ClasspathIndex {
    /// Builds an index from `sources` in order; the first source to define a
    /// given fqcn wins over later ones (§8 property 7).
    pub fn build(sources: &[PathBuf]) -> Result<ClasspathIndex, JvmError> {
        let mut index = ClasspathIndex::default();
        let mut visited = HashSet::new();
        for source in sources {
            index.index_source(source, &mut visited)?;
        }
        Ok(index)
    }

    fn index_source(&mut self, source: &Path, visited: &mut HashSet<PathBuf>) -> Result<(), JvmError> {
        if source.is_dir() {
            self.index_directory(source)
        } else {
            self.index_jar(source, visited)
        }
    }

    /// Indexes `path`'s own `.class` entries, then follows its
    /// `META-INF/MANIFEST.MF` `Class-Path:` header (§4.7) to pull in sibling
    /// jars relative to `path`'s directory, recursively. `visited` guards
    /// against a jar's `Class-Path:` cycling back on itself or an ancestor.
    fn index_jar(&mut self, path: &Path, visited: &mut HashSet<PathBuf>) -> Result<(), JvmError> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(canonical) {
            log::debug!("skipping already-indexed jar {}", path.display());
            return Ok(());
        }

        let mut archive = Archive::open(path)?;
        for entry in archive.class_entries()? {
            let fqcn = entry_name_to_fqcn(&entry.name);
            self.sources.entry(fqcn).or_insert_with(|| path.to_path_buf());
        }

        let class_path = archive.manifest_class_path()?;
        if class_path.is_empty() {
            return Ok(());
        }
        log::debug!("{} declares Class-Path: {}", path.display(), class_path.join(" "));
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        for sibling in class_path {
            let sibling_path = parent.join(&sibling);
            if !sibling_path.is_file() {
                log::warn!("{} Class-Path entry {sibling} does not exist, skipping", path.display());
                continue;
            }
            self.index_jar(&sibling_path, visited)?;
        }
        Ok(())
    }

    /// Full recursive walk (REDESIGN FLAG (c) / Open Question (c)): every
    /// `.class` file under `dir`, at any depth, contributes an entry.
    fn index_directory(&mut self, dir: &Path) -> Result<(), JvmError> {
        for entry in WalkDir::new(dir).follow_links(false).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("class") {
                continue;
            }
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            let fqcn = path_to_fqcn(relative);
            self.sources.entry(fqcn).or_insert_with(|| dir.to_path_buf());
        }
        Ok(())
    }

    pub fn source_of(&self, fqcn: &str) -> Option<&Path> {
        self.sources.get(fqcn).map(PathBuf::as_path)
    }

    pub fn contains(&self, fqcn: &str) -> bool {
        self.sources.contains_key(fqcn)
    }
}

fn entry_name_to_fqcn(entry_name: &str) -> String {
    entry_name.trim_end_matches(".class").replace('/', ".")
}

fn path_to_fqcn(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

fn package_of(fqcn: &str) -> String {
    match fqcn.rsplit_once('.') {
        Some((package, _)) => package.to_string(),
        None => String::new(),
    }
}

/// One input file's classpath resolution report: per referenced package, the
/// set of sources (in first-seen order) that supply it, plus the symbols
/// that resolved to nothing.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub packages: Vec<(String, Vec<PathBuf>)>,
    pub unresolved: Vec<String>,
}

/// Resolves `referenced_fqcns` (already deduplicated by the caller if
/// desired) against `boot` first, then `user`, grouping results by package
/// in first-encountered order (§4.8 "Resolution contract").
pub fn resolve(referenced_fqcns: &[String], boot: &ClasspathIndex, user: &ClasspathIndex) -> Report {
    let mut by_package: Vec<(String, Vec<PathBuf>)> = Vec::new();
    let mut unresolved = Vec::new();

    for fqcn in referenced_fqcns {
        let package = package_of(fqcn);
        let source = boot.source_of(fqcn).or_else(|| user.source_of(fqcn));
        match source {
            Some(path) => {
                let entry = by_package.iter_mut().find(|(pkg, _)| pkg == &package);
                let path = path.to_path_buf();
                match entry {
                    Some((_, sources)) => {
                        if !sources.contains(&path) {
                            sources.push(path);
                        }
                    }
                    None => by_package.push((package, vec![path])),
                }
            }
            None => {
                log::warn!("{fqcn} resolved against neither boot nor user classpath");
                if !by_package.iter().any(|(pkg, _)| pkg == &package) {
                    by_package.push((package, Vec::new()));
                }
                unresolved.push(fqcn.clone());
            }
        }
    }

    log::debug!(
        "resolved {} package(s), {} unresolved symbol(s)",
        by_package.len(),
        unresolved.len()
    );
    Report {
        packages: by_package,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_name_translates_slashes_to_dots() {
        assert_eq!(entry_name_to_fqcn("java/lang/Object.class"), "java.lang.Object");
    }

    #[test]
    fn package_of_extracts_enclosing_package() {
        assert_eq!(package_of("java.lang.Object"), "java.lang");
        assert_eq!(package_of("TopLevel"), "");
    }

    #[test]
    fn resolve_groups_by_package_and_records_unresolved() {
        let mut boot = ClasspathIndex::default();
        boot.sources.insert("java.lang.Object".into(), PathBuf::from("rt.jar"));
        let user = ClasspathIndex::default();

        let report = resolve(
            &["java.lang.Object".to_string(), "com.example.Missing".to_string()],
            &boot,
            &user,
        );
        assert_eq!(report.packages[0].0, "java.lang");
        assert_eq!(report.packages[0].1, vec![PathBuf::from("rt.jar")]);
        assert_eq!(report.unresolved, vec!["com.example.Missing".to_string()]);
    }
}
