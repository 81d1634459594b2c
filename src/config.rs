use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{MergePolicy, Result};

/// Legacy header names and their canonical replacement.
///
/// Victim fields are folded to their bare name here so that the perpetrator
/// copies after the pivot column can be told apart; they get their `_victima`
/// suffix back afterwards (see [`VICTIM_RENAME`]).
const RENAME_MAP: &[(&str, &str)] = &[
    ("categorias_red_chilena", "categoria_red_chilena"),
    ("registrado_sernameg", "registro_sernameg"),
    ("ulitma_fecha_modificacion", "ultima_fecha_modificacion"),
    ("informacion_actualizada_por_ultima_vez", "ultima_fecha_modificacion"),
    ("informe_del_poder_judicial", "informe_poder_judicial"),
    ("antecedentes_sobre_hecho", "antecedentes_hecho"),
    ("edad_victima", "edad"),
    ("nacionalidad_victima", "nacionalidad"),
    ("ocupacion_victima", "ocupacion"),
];

const VICTIM_RENAME: &[(&str, &str)] = &[
    ("edad", "edad_victima"),
    ("nacionalidad", "nacionalidad_victima"),
    ("ocupacion", "ocupacion_victima"),
];

/// Region spellings seen across the yearly sheets, after text normalization
const REGION_MAP: &[(&str, &str)] = &[
    ("biobio", "bio bio"),
    ("ohiggins", "o'higgins"),
    ("o'higgings", "o'higgins"),
    ("region metropolitana", "metropolitana"),
    ("metropolitano", "metropolitana"),
    ("la araucania", "araucania"),
    ("el maule", "maule"),
    ("arica", "arica y parinacota"),
    ("iquique", "tarapaca"),
    ("metropolitana/tarapaca", "metropolitana"),
];

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Immutable configuration of the per-source reconciliation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Legacy -> canonical column names, applied right after header cleanup
    pub rename_map: BTreeMap<String, String>,

    /// Bare victim field -> victim-scoped name, applied after duplicate suffixing
    pub victim_rename: BTreeMap<String, String>,

    /// Variant -> canonical region spelling
    pub region_map: BTreeMap<String, String>,

    /// Column holding the case date
    pub date_column: String,

    /// Column whose values are canonicalized through `region_map`
    pub region_column: String,

    /// Header spellings of the perpetrator name column
    pub perpetrator_aliases: Vec<String>,

    /// Canonical perpetrator name column; anchors duplicate suffixing
    pub pivot_column: String,

    /// Suffix for repeated field names after the pivot column
    pub perpetrator_suffix: String,

    /// Prefix of placeholder headers to drop
    pub unnamed_prefix: String,

    /// Canonical classification column
    pub classification_column: String,

    /// Older classification column merged into `classification_column`
    pub legacy_classification_column: String,

    /// Behavior when one of the classification columns is absent
    pub merge_policy: MergePolicy,

    /// Last column kept from a source; trailing extras are discarded
    pub terminal_column: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            rename_map: to_map(RENAME_MAP),
            victim_rename: to_map(VICTIM_RENAME),
            region_map: to_map(REGION_MAP),
            date_column: "fecha".to_string(),
            region_column: "region".to_string(),
            perpetrator_aliases: vec!["femicida".to_string(), "femicidia".to_string()],
            pivot_column: "nombre_femicida".to_string(),
            perpetrator_suffix: "_femicida".to_string(),
            unnamed_prefix: "unnamed".to_string(),
            classification_column: "categoria_red_chilena".to_string(),
            legacy_classification_column: "tipificacion_red_chilena".to_string(),
            merge_policy: MergePolicy::Strict,
            terminal_column: "ultima_fecha_modificacion".to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Load a configuration file; keys that are not present keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub(crate) fn rename_lookup(&self) -> HashMap<String, String> {
        self.rename_map.clone().into_iter().collect()
    }

    pub(crate) fn victim_lookup(&self) -> HashMap<String, String> {
        self.victim_rename.clone().into_iter().collect()
    }

    pub(crate) fn perpetrator_lookup(&self) -> HashMap<String, String> {
        self.perpetrator_aliases
            .iter()
            .map(|alias| (alias.clone(), self.pivot_column.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ReconcileConfig::default();
        assert_eq!(config.date_column, "fecha");
        assert_eq!(config.region_map.get("biobio"), Some(&"bio bio".to_string()));
        assert_eq!(
            config.rename_map.get("edad_victima"),
            Some(&"edad".to_string())
        );
        assert_eq!(config.merge_policy, MergePolicy::Strict);
    }

    #[test]
    fn test_perpetrator_lookup() {
        let lookup = ReconcileConfig::default().perpetrator_lookup();
        assert_eq!(lookup.get("femicidia"), Some(&"nombre_femicida".to_string()));
        assert_eq!(lookup.get("femicida"), Some(&"nombre_femicida".to_string()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            file,
            r#"{{"merge_policy": "lenient", "region_map": {{"nuble": "ñuble"}}}}"#
        )
        .unwrap();

        let config = ReconcileConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.merge_policy, MergePolicy::Lenient);
        assert_eq!(config.region_map.len(), 1);
        assert_eq!(config.pivot_column, "nombre_femicida");
    }
}
