//! Row display density

use serde::Deserialize;
use serde::Serialize;

/// How much vertical space each row gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowDensity {
    Compact,
    #[default]
    Standard,
    Expanded,
}

impl RowDensity {
    /// Lines of cell content shown per row.
    pub fn content_lines(self) -> usize {
        match self {
            Self::Compact => 1,
            Self::Standard => 2,
            Self::Expanded => 3,
        }
    }

    /// Row height in pixels.
    pub fn row_height(self) -> u32 {
        match self {
            Self::Compact => 36,
            Self::Standard => 64,
            Self::Expanded => 92,
        }
    }

    /// Largest density whose height does not exceed `height`.
    pub fn from_row_height(height: u32) -> Self {
        if height >= Self::Expanded.row_height() {
            Self::Expanded
        } else if height >= Self::Standard.row_height() {
            Self::Standard
        } else {
            Self::Compact
        }
    }
}

/// Table-level display settings stored with the table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableSettings {
    /// Configured row height in pixels.
    pub row_height: Option<u32>,
}

impl TableSettings {
    /// Sets the row height (builder pattern).
    pub fn with_row_height(mut self, height: u32) -> Self {
        self.row_height = Some(height);
        self
    }

    /// Density derived from the row height; standard when unset.
    pub fn density(&self) -> RowDensity {
        self.row_height.map(RowDensity::from_row_height).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_lines() {
        assert_eq!(RowDensity::Compact.content_lines(), 1);
        assert_eq!(RowDensity::Standard.content_lines(), 2);
        assert_eq!(RowDensity::Expanded.content_lines(), 3);
    }

    #[test]
    fn test_from_row_height() {
        assert_eq!(RowDensity::from_row_height(36), RowDensity::Compact);
        assert_eq!(RowDensity::from_row_height(64), RowDensity::Standard);
        assert_eq!(RowDensity::from_row_height(92), RowDensity::Expanded);
        assert_eq!(RowDensity::from_row_height(80), RowDensity::Standard);
        assert_eq!(RowDensity::from_row_height(120), RowDensity::Expanded);
        assert_eq!(RowDensity::from_row_height(10), RowDensity::Compact);
    }

    #[test]
    fn test_settings_default_to_standard() {
        assert_eq!(TableSettings::default().density(), RowDensity::Standard);
        assert_eq!(TableSettings::default().with_row_height(92).density(), RowDensity::Expanded);
    }

    #[test]
    fn test_settings_from_json() {
        let settings: TableSettings = serde_json::from_str(r#"{"rowHeight": 36}"#).unwrap();
        assert_eq!(settings.density(), RowDensity::Compact);

        let empty: TableSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.row_height, None);
    }

    #[test]
    fn test_density_serde() {
        assert_eq!(serde_json::to_string(&RowDensity::Expanded).unwrap(), r#""expanded""#);
    }
}
