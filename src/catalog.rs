// Outlet catalog and the run-time configuration surface.
//
// The catalog is a fixed, ordered mapping from outlet display name to the
// CSV file holding that outlet's export. It is loaded once at startup and
// never mutated; an optional JSON config file can replace the built-in
// catalog and flip the report variant flags.
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct OutletSource {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone)]
pub struct OutletCatalog {
    entries: Vec<OutletSource>,
}

impl OutletCatalog {
    pub fn new(entries: Vec<OutletSource>) -> Self {
        OutletCatalog { entries }
    }

    /// The built-in outlet set; order here is the order shown in the
    /// selection menu.
    pub fn default_catalog() -> Self {
        let pairs: &[(&str, &str)] = &[
            ("Hilal", "hilal.csv"),
            ("Safa Super", "safa super market.csv"),
            ("Azhar HP", "azhar hp.csv"),
            ("Azhar", "azhar gt.csv"),
            ("Blue Pearl", "blue pearl.csv"),
            ("Fida", "fida al madina.csv"),
            ("Hadeqat", "hadeqat.csv"),
            ("Jais", "jais.csv"),
            ("Sabah", "sabah.csv"),
            ("Sahat", "sahat.csv"),
            ("Shams salem", "shams.csv"),
            ("Shams Liwan", "liwan.csv"),
            ("Superstore", "superstore.csv"),
            ("Tay Tay", "taytay.csv"),
            ("Safa oudmehta", "safa oud metha.csv"),
            ("Port saeed", "port saeed.csv"),
        ];
        OutletCatalog::new(
            pairs
                .iter()
                .map(|(name, file)| OutletSource {
                    name: (*name).to_string(),
                    file: (*file).to_string(),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[OutletSource] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The single enumerated input that drives every view: either the full
/// combined dataset or one specific outlet from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Outlet(String),
}

impl Selection {
    pub fn label(&self) -> &str {
        match self {
            Selection::All => "All",
            Selection::Outlet(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Variant flags unifying the near-duplicate report scripts: absolute-value
/// handling for returns, ranking depth, per-outlet breakdown of the ranking
/// and whether the `Tax` column participates.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub apply_abs: bool,
    pub top_n: usize,
    pub breakdown_by_outlet: bool,
    pub include_tax: bool,
}

impl Default for ReportOptions {
    // Defaults model the return-analysis dashboard.
    fn default() -> Self {
        ReportOptions {
            apply_abs: true,
            top_n: 10,
            breakdown_by_outlet: false,
            include_tax: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub outlets: Option<Vec<OutletSource>>,
    pub report: ReportOptions,
}

impl AppConfig {
    /// Read the JSON config file if it exists; a missing file means the
    /// built-in defaults. A present-but-broken file is an error so a typo
    /// does not silently fall back to a different outlet set.
    pub fn load(path: &str) -> Result<AppConfig, Box<dyn Error>> {
        if !Path::new(path).exists() {
            return Ok(AppConfig::default());
        }
        let text = fs::read_to_string(path)?;
        let cfg: AppConfig = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    pub fn catalog(&self) -> OutletCatalog {
        match &self.outlets {
            Some(entries) => OutletCatalog::new(entries.clone()),
            None => OutletCatalog::default_catalog(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_ordered_and_complete() {
        let cat = OutletCatalog::default_catalog();
        assert_eq!(cat.len(), 16);
        assert_eq!(cat.entries()[0].name, "Hilal");
        assert_eq!(cat.entries()[15].name, "Port saeed");
        assert!(cat.contains("Blue Pearl"));
        assert!(!cat.contains("Nonexistent"));
    }

    #[test]
    fn config_json_overrides_catalog_and_flags() {
        let text = r#"{
            "outlets": [{ "name": "A", "file": "a.csv" }],
            "report": { "apply_abs": false, "top_n": 30, "include_tax": true }
        }"#;
        let cfg: AppConfig = serde_json::from_str(text).unwrap();
        let cat = cfg.catalog();
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.entries()[0].file, "a.csv");
        assert!(!cfg.report.apply_abs);
        assert_eq!(cfg.report.top_n, 30);
        assert!(cfg.report.include_tax);
        assert!(!cfg.report.breakdown_by_outlet);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let cfg = AppConfig::load("definitely_not_here.json").unwrap();
        assert!(cfg.outlets.is_none());
        assert!(cfg.report.apply_abs);
        assert_eq!(cfg.report.top_n, 10);
    }
}
