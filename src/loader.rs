use crate::catalog::OutletCatalog;
use crate::types::{RawRow, TransactionRecord};
use crate::util::parse_money_safe;
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no outlet file could be loaded ({attempted} catalog entries tried)")]
    NoUsableFiles { attempted: usize },
    #[error("outlet catalog is empty")]
    EmptyCatalog,
}

/// Diagnostics from one combined-load pass. Data-quality problems are
/// absorbed during loading and only counted here; the caller decides what
/// to print.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub files_loaded: usize,
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub coerced_values: usize,
    pub warnings: Vec<String>,
}

/// Coerce one raw cell to a number under the variant's sign policy,
/// counting cells that held a value we had to throw away.
fn coerce_cell(raw: Option<&str>, apply_abs: bool, coerced: &mut usize) -> f64 {
    match parse_money_safe(raw) {
        Some(v) => {
            if apply_abs {
                v.abs()
            } else {
                v
            }
        }
        None => {
            if raw.map_or(false, |s| !s.trim().is_empty()) {
                *coerced += 1;
            }
            0.0
        }
    }
}

fn load_outlet_file(
    path: &str,
    outlet: &str,
    apply_abs: bool,
    report: &mut LoadReport,
) -> Result<Vec<TransactionRecord>, csv::Error> {
    // Headers are trimmed so two exports whose column names differ only by
    // stray whitespace still land in the same columns.
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };
        records.push(TransactionRecord {
            outlet: outlet.to_string(),
            description: row.description,
            total_before_tax: coerce_cell(
                row.total_before_tax.as_deref(),
                apply_abs,
                &mut report.coerced_values,
            ),
            total_after_tax: coerce_cell(
                row.total_after_tax.as_deref(),
                apply_abs,
                &mut report.coerced_values,
            ),
            tax: coerce_cell(row.tax.as_deref(), apply_abs, &mut report.coerced_values),
        });
    }
    Ok(records)
}

/// Load every catalog entry whose file exists, tag each row with its outlet
/// and concatenate. Missing files are recorded as warnings and skipped; if
/// nothing loads at all the run cannot proceed and we return an error
/// instead of an empty dataset.
pub fn load_combined(
    catalog: &OutletCatalog,
    apply_abs: bool,
) -> Result<(Vec<TransactionRecord>, LoadReport), LoadError> {
    if catalog.is_empty() {
        return Err(LoadError::EmptyCatalog);
    }
    let mut report = LoadReport::default();
    let mut combined: Vec<TransactionRecord> = Vec::new();
    for entry in catalog.entries() {
        if !Path::new(&entry.file).exists() {
            report
                .warnings
                .push(format!("File not found: {} ({})", entry.file, entry.name));
            continue;
        }
        match load_outlet_file(&entry.file, &entry.name, apply_abs, &mut report) {
            Ok(mut rows) => {
                report.files_loaded += 1;
                combined.append(&mut rows);
            }
            Err(e) => {
                report
                    .warnings
                    .push(format!("Could not read {}: {}", entry.file, e));
            }
        }
    }
    if report.files_loaded == 0 {
        return Err(LoadError::NoUsableFiles {
            attempted: catalog.len(),
        });
    }
    Ok((combined, report))
}

/// Process-lifetime cache around `load_combined`.
///
/// The combined dataset is loaded once and shared immutably; every menu
/// interaction reuses the same `Arc` until `invalidate` forces the next
/// access to re-read the source files. Load failures are not cached, so a
/// fixed file set can be picked up by simply retrying.
pub struct DatasetCache {
    inner: Mutex<Option<Arc<(Vec<TransactionRecord>, LoadReport)>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        DatasetCache {
            inner: Mutex::new(None),
        }
    }

    pub fn get_or_load(
        &self,
        catalog: &OutletCatalog,
        apply_abs: bool,
    ) -> Result<Arc<(Vec<TransactionRecord>, LoadReport)>, LoadError> {
        let mut slot = self.inner.lock().unwrap();
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }
        let loaded = Arc::new(load_combined(catalog, apply_abs)?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop the cached dataset; the next `get_or_load` re-reads from disk.
    pub fn invalidate(&self) {
        *self.inner.lock().unwrap() = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().unwrap().is_some()
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        DatasetCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OutletSource;
    use std::fs;
    use tempfile::TempDir;

    fn catalog_in(dir: &TempDir, entries: &[(&str, &str)]) -> OutletCatalog {
        OutletCatalog::new(
            entries
                .iter()
                .map(|(name, file)| OutletSource {
                    name: (*name).to_string(),
                    file: dir.path().join(file).to_string_lossy().into_owned(),
                })
                .collect(),
        )
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn missing_file_is_a_warning_not_an_error() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax\nWidget,100,105\n",
        );
        let catalog = catalog_in(&dir, &[("A", "a.csv"), ("B", "b.csv")]);

        let (data, report) = load_combined(&catalog, true).unwrap();
        assert_eq!(data.len(), 1);
        assert!(data.iter().all(|r| r.outlet == "A"));
        assert_eq!(report.files_loaded, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("b.csv"));
    }

    #[test]
    fn no_usable_files_is_fatal() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog_in(&dir, &[("A", "a.csv"), ("B", "b.csv")]);
        match load_combined(&catalog, true) {
            Err(LoadError::NoUsableFiles { attempted }) => assert_eq!(attempted, 2),
            other => panic!("expected NoUsableFiles, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_catalog_is_fatal() {
        let catalog = OutletCatalog::new(vec![]);
        assert!(matches!(
            load_combined(&catalog, true),
            Err(LoadError::EmptyCatalog)
        ));
    }

    #[test]
    fn negative_amounts_fold_to_positive_in_returns_variant() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax\nBroken jar,-47.62,-50\n",
        );
        let catalog = catalog_in(&dir, &[("A", "a.csv")]);
        let (data, _) = load_combined(&catalog, true).unwrap();
        assert_eq!(data[0].total_before_tax, 47.62);
        assert_eq!(data[0].total_after_tax, 50.0);
    }

    #[test]
    fn sales_variant_keeps_sign_and_reads_tax() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax,Tax\nWidget,-100,-105,-5\n",
        );
        let catalog = catalog_in(&dir, &[("A", "a.csv")]);
        let (data, _) = load_combined(&catalog, false).unwrap();
        assert_eq!(data[0].total_before_tax, -100.0);
        assert_eq!(data[0].total_after_tax, -105.0);
        assert_eq!(data[0].tax, -5.0);
    }

    #[test]
    fn unparseable_values_and_missing_columns_become_zero() {
        let dir = TempDir::new().unwrap();
        // No Tax column at all, and one cell of junk.
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax\nWidget,abc,105\n,50,\n",
        );
        let catalog = catalog_in(&dir, &[("A", "a.csv")]);
        let (data, report) = load_combined(&catalog, true).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].total_before_tax, 0.0);
        assert_eq!(data[0].total_after_tax, 105.0);
        assert!(data.iter().all(|r| r.tax == 0.0));
        // Empty description survives as a row, not an error.
        assert!(data[1].description.as_deref().unwrap_or("").is_empty());
        assert_eq!(report.coerced_values, 1);
    }

    #[test]
    fn header_whitespace_does_not_split_columns() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax\nWidget,10,11\n",
        );
        write_file(
            &dir,
            "b.csv",
            " Description , Total Before Tax , Total After Tax \nGadget,20,21\n",
        );
        let catalog = catalog_in(&dir, &[("A", "a.csv"), ("B", "b.csv")]);
        let (data, _) = load_combined(&catalog, true).unwrap();
        assert_eq!(data.len(), 2);
        let b = data.iter().find(|r| r.outlet == "B").unwrap();
        assert_eq!(b.description.as_deref(), Some("Gadget"));
        assert_eq!(b.total_after_tax, 21.0);
    }

    #[test]
    fn cache_loads_once_and_reloads_after_invalidate() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax\nWidget,10,11\n",
        );
        let catalog = catalog_in(&dir, &[("A", "a.csv")]);
        let cache = DatasetCache::new();

        let first = cache.get_or_load(&catalog, true).unwrap();
        assert_eq!(first.0.len(), 1);

        // Grow the file behind the cache's back; the cached view must not
        // change until invalidated.
        write_file(
            &dir,
            "a.csv",
            "Description,Total Before Tax,Total After Tax\nWidget,10,11\nGadget,20,21\n",
        );
        let second = cache.get_or_load(&catalog, true).unwrap();
        assert_eq!(second.0.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        cache.invalidate();
        let third = cache.get_or_load(&catalog, true).unwrap();
        assert_eq!(third.0.len(), 2);
    }
}
