//! Operation options parsed from multipart string fields.
//!
//! Parsing is purely syntactic. Bounds against an actual page count are
//! checked by the PDF service, which skips out-of-range entries instead of
//! failing the request.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown split mode `{0}` (expected all, range or pages)")]
    UnknownSplitMode(String),
    #[error("malformed page range `{0}`")]
    MalformedRange(String),
    #[error("malformed page number `{0}`")]
    MalformedPage(String),
    #[error("invalid rotation `{0}` (must be a multiple of 90 degrees)")]
    InvalidRotation(String),
    #[error("invalid permissions: {0}")]
    InvalidPermissions(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    All,
    Range,
    Pages,
}

impl SplitMode {
    pub fn parse(raw: &str) -> Result<Self, OptionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "range" => Ok(Self::Range),
            "pages" => Ok(Self::Pages),
            _ => Err(OptionError::UnknownSplitMode(raw.to_string())),
        }
    }
}

/// A 1-based inclusive page interval as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Whether the range is non-empty and lies within `1..=total`.
    pub fn fits(&self, total: u32) -> bool {
        self.start >= 1 && self.start <= self.end && self.end <= total
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Parse `"1-3, 5, 8-10"` into ranges, preserving order and duplicates.
///
/// A bare number `n` is read as `n-n`. Entries that are not numbers at all
/// are rejected; entries that are numeric but reversed or out of bounds are
/// kept here and skipped later against the document.
pub fn parse_ranges(input: &str) -> Result<Vec<PageRange>, OptionError> {
    let mut ranges = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (part, part),
        };
        let start: u32 = start
            .parse()
            .map_err(|_| OptionError::MalformedRange(part.to_string()))?;
        let end: u32 = end
            .parse()
            .map_err(|_| OptionError::MalformedRange(part.to_string()))?;

        ranges.push(PageRange { start, end });
    }

    Ok(ranges)
}

/// Parse `"3, 1, 2"` into 1-based page numbers in the order given.
pub fn parse_page_list(input: &str) -> Result<Vec<u32>, OptionError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<u32>()
                .map_err(|_| OptionError::MalformedPage(p.to_string()))
        })
        .collect()
}

/// Clockwise rotation, normalized into `0..360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation(i64);

impl Rotation {
    pub fn new(degrees: i64) -> Result<Self, OptionError> {
        if degrees.rem_euclid(90) != 0 {
            return Err(OptionError::InvalidRotation(degrees.to_string()));
        }
        Ok(Self(degrees.rem_euclid(360)))
    }

    pub fn parse(raw: &str) -> Result<Self, OptionError> {
        let degrees: i64 = raw
            .trim()
            .parse()
            .map_err(|_| OptionError::InvalidRotation(raw.to_string()))?;
        Self::new(degrees)
    }

    pub fn degrees(self) -> i64 {
        self.0
    }

    /// Add this rotation to an existing `/Rotate` value.
    pub fn apply_to(self, current: i64) -> i64 {
        (current + self.0).rem_euclid(360)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    /// Unknown or missing levels fall back to `Medium`.
    pub fn from_field(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("low") => Self::Low,
            Some("high") => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Requested document permissions. Recorded, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub printing: bool,
    pub copying: bool,
    pub editing: bool,
    pub commenting: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            printing: true,
            copying: true,
            editing: true,
            commenting: true,
        }
    }
}

impl Permissions {
    /// A missing field grants everything; a present field must be a JSON
    /// object whose absent keys are denied.
    pub fn from_field(raw: Option<&str>) -> Result<Self, OptionError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => {
                let value: serde_json::Value = serde_json::from_str(json)
                    .map_err(|e| OptionError::InvalidPermissions(e.to_string()))?;
                let object = value.as_object().ok_or_else(|| {
                    OptionError::InvalidPermissions("expected a JSON object".into())
                })?;
                let flag = |key: &str| object.get(key).and_then(|v| v.as_bool()).unwrap_or(false);
                Ok(Self {
                    printing: flag("printing"),
                    copying: flag("copying"),
                    editing: flag("editing"),
                    commenting: flag("commenting"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_ranges_in_order() {
        let ranges = parse_ranges("1-2, 4-4,7").unwrap();
        assert_eq!(
            ranges,
            vec![
                PageRange { start: 1, end: 2 },
                PageRange { start: 4, end: 4 },
                PageRange { start: 7, end: 7 },
            ]
        );
    }

    #[test]
    fn reversed_and_out_of_bounds_ranges_parse_but_do_not_fit() {
        let ranges = parse_ranges("5-3,10-20,0-1").unwrap();
        assert!(ranges.iter().all(|r| !r.fits(5)));
    }

    #[test]
    fn non_numeric_range_is_rejected() {
        assert_eq!(
            parse_ranges("1-2,a-b"),
            Err(OptionError::MalformedRange("a-b".into()))
        );
        assert!(parse_ranges("-3").is_err());
    }

    #[test]
    fn page_list_keeps_order_and_duplicates() {
        assert_eq!(parse_page_list(" 3,1 ,3, ").unwrap(), vec![3, 1, 3]);
        assert!(parse_page_list("1,two").is_err());
    }

    #[test]
    fn rotation_composes_modulo_360() {
        let quarter = Rotation::parse("90").unwrap();
        let three_quarters = Rotation::parse("270").unwrap();
        assert_eq!(three_quarters.apply_to(quarter.apply_to(0)), 0);
        assert_eq!(Rotation::parse("-90").unwrap().degrees(), 270);
        assert_eq!(Rotation::parse("450").unwrap().degrees(), 90);
        assert!(Rotation::parse("45").is_err());
        assert!(Rotation::parse("ninety").is_err());
    }

    #[test]
    fn compression_level_defaults_to_medium() {
        assert_eq!(CompressionLevel::from_field(None), CompressionLevel::Medium);
        assert_eq!(
            CompressionLevel::from_field(Some("extreme")),
            CompressionLevel::Medium
        );
        assert_eq!(
            CompressionLevel::from_field(Some("HIGH")),
            CompressionLevel::High
        );
    }

    #[test]
    fn split_mode_parsing() {
        assert_eq!(SplitMode::parse("range").unwrap(), SplitMode::Range);
        assert!(SplitMode::parse("halves").is_err());
    }

    #[test]
    fn permissions_from_json() {
        let perms = Permissions::from_field(Some(r#"{"printing":true,"copying":false}"#)).unwrap();
        assert!(perms.printing);
        assert!(!perms.copying);
        assert!(!perms.editing);

        assert_eq!(Permissions::from_field(None).unwrap(), Permissions::default());
        assert!(Permissions::from_field(Some("not json")).is_err());
        assert!(Permissions::from_field(Some("[1,2]")).is_err());
    }
}
