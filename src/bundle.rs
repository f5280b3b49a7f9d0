//! Zips the outputs of a batch conversion into one archive.

use std::collections::HashSet;
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::writer::xml::Package;

/// `name`, or `stem-N.ext` for the first N that is not taken yet.
fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());
    let dir = name.strip_suffix(path.file_name().and_then(|f| f.to_str()).unwrap_or("")).unwrap_or("");
    (2..)
        .map(|n| match ext {
            Some(ext) => format!("{}{}-{}.{}", dir, stem, n, ext),
            None => format!("{}{}-{}", dir, stem, n),
        })
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Archives `(file name, bytes)` pairs in order. Repeated names get a numeric suffix.
pub fn bundle(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut pkg = Package::new();
    let mut taken = HashSet::new();
    for (name, bytes) in entries {
        let name = unique_name(name, &taken);
        debug!("bundling {} ({} bytes)", name, bytes.len());
        pkg.add(&name, bytes)?;
        taken.insert(name);
    }
    pkg.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn bundles_entries_in_order() {
        let bytes = bundle(&[
            ("a.docx".to_string(), b"one".to_vec()),
            ("b.pdf".to_string(), b"two".to_vec()),
        ])
        .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "a.docx");
        let mut s = String::new();
        archive.by_name("b.pdf").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "two");
    }

    #[test]
    fn repeated_names_are_suffixed() {
        let bytes = bundle(&[
            ("out/report.docx".to_string(), vec![1]),
            ("out/report.docx".to_string(), vec![2]),
            ("notes".to_string(), vec![3]),
            ("notes".to_string(), vec![4]),
        ])
        .unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, ["notes", "notes-2", "out/report-2.docx", "out/report.docx"]);
    }

    #[test]
    fn empty_batch_is_a_valid_archive() {
        let bytes = bundle(&[]).unwrap();
        assert_eq!(zip::ZipArchive::new(Cursor::new(bytes)).unwrap().len(), 0);
    }
}
