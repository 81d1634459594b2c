use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::Table;

use super::text::strip_diacritics;

/// Trailing `<separator><digits>` left by spreadsheet exports ("region.1", "edad 2")
static NUMERIC_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._\-\s]?\d+$").unwrap());

/// A single run of letters with a numeric suffix and no underscore ("Edad.1", "Region2")
static STRUCTURAL_SUFFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÁÉÍÓÚÑÜáéíóúñü]+[._\-]?\d+$").unwrap());

static STRUCTURAL_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._\-]?\d+$").unwrap());

/// Minimum token length kept by [`normalize_column_name`] (numeric tokens are always kept)
const MIN_TOKEN_CHARS: usize = 3;

/// Normalize a raw header into a lowercase, underscore-joined, ASCII-friendly name.
///
/// Short connector words ("de", "la", "N°") are dropped; numeric tokens survive.
/// The result is stable under repeated application.
pub fn normalize_column_name(raw: &str) -> String {
    let mut current = normalize_pass(raw);
    // a stripped tail can expose another numeric tail or a short token ("1 2 3")
    loop {
        let next = normalize_pass(&current);
        if next.len() >= current.len() {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_suffix = NUMERIC_SUFFIX.replace(trimmed, "");
    let folded = strip_diacritics(&without_suffix).to_lowercase();

    let kept: String = folded
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let tokens: Vec<&str> = kept
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS || w.chars().all(char::is_numeric))
        .collect();

    let joined = tokens.join("_");
    // punctuation removal can expose a new numeric tail ("casos 12 .")
    NUMERIC_SUFFIX.replace(&joined, "").into_owned()
}

/// Normalize every header of the table in place
pub fn clean_columns(table: &mut Table) {
    table.map_columns(|c| normalize_column_name(c));
}

/// Trim a raw header and collapse an export-generated numeric suffix on a
/// single-word name ("Edad.1" -> "Edad"). Multi-word and underscored names only
/// get trimmed.
pub fn strip_structural_suffix(raw: &str) -> String {
    let trimmed = raw.trim();
    if STRUCTURAL_SUFFIXED.is_match(trimmed) {
        STRUCTURAL_SUFFIX.replace(trimmed, "").into_owned()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accented() {
        assert_eq!(normalize_column_name("Región"), "region");
    }

    #[test]
    fn test_normalize_no_surviving_token() {
        assert_eq!(normalize_column_name("N°"), "");
    }

    #[test]
    fn test_normalize_drops_connectors() {
        assert_eq!(
            normalize_column_name("Categoría de la Red Chilena"),
            "categoria_red_chilena"
        );
        assert_eq!(
            normalize_column_name("Relación víctima/femicida"),
            "relacion_victimafemicida"
        );
    }

    #[test]
    fn test_normalize_strips_trailing_numeric_suffix() {
        assert_eq!(normalize_column_name("region.1"), "region");
        assert_eq!(normalize_column_name(" Edad 2 "), "edad");
    }

    #[test]
    fn test_normalize_keeps_inner_numeric_tokens() {
        assert_eq!(normalize_column_name("Ley 20 480 aplicada"), "ley_20_480_aplicada");
    }

    #[test]
    fn test_normalize_all_digit_tokens_collapse() {
        assert_eq!(normalize_column_name("1 2 3"), "");
        assert_eq!(normalize_column_name("N° 12 34 5"), "");
    }

    #[test]
    fn test_normalize_keeps_non_ascii_digit_tokens() {
        assert_eq!(normalize_column_name("caso ٣ fecha"), "caso_٣_fecha");
    }

    #[test]
    fn test_normalize_keeps_underscores() {
        assert_eq!(normalize_column_name("fecha_hecho"), "fecha_hecho");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "Región",
            "N°",
            "Categoría de la Red Chilena",
            "Nombre Femicida.1",
            "casos 12 .",
            "Año 2015 (casos)",
            "Última fecha de modificación",
            "  Edad  ",
            "2015",
            "Unnamed: 14",
            "ﬁcha técnica",
            "1 2 3",
            "N° 12 34 5",
            "ab_12 x",
        ];
        for sample in samples {
            let once = normalize_column_name(sample);
            assert_eq!(normalize_column_name(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_clean_columns() {
        let mut table = Table::new(vec!["Fecha".to_string(), "Región".to_string()]);
        clean_columns(&mut table);
        assert_eq!(table.columns(), &["fecha".to_string(), "region".to_string()]);
    }

    #[test]
    fn test_strip_structural_suffix() {
        assert_eq!(strip_structural_suffix(" Edad.1 "), "Edad");
        assert_eq!(strip_structural_suffix("Región2"), "Región");
        assert_eq!(strip_structural_suffix("Ocupación-3"), "Ocupación");
    }

    #[test]
    fn test_strip_structural_suffix_leaves_compound_names() {
        assert_eq!(strip_structural_suffix("edad_victima.1"), "edad_victima.1");
        assert_eq!(strip_structural_suffix("Nombre Femicida.1"), "Nombre Femicida.1");
        assert_eq!(strip_structural_suffix("Edad"), "Edad");
    }
}
