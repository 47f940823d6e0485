use std::collections::BTreeSet;
use std::str::FromStr;

/// How the first row of a detected table is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    #[default]
    AutoDetect,
    HasHeader,
    NoHeader,
}

/// What to do with tables whose layout confidence is low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityMode {
    #[default]
    BestEffort,
    Strict,
    SkipAmbiguous,
}

/// A set of 1-based page numbers, parsed from specs like `1-3,5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn parse_page_number(token: &str, what: &str) -> Result<u32, String> {
    let page: u32 = token
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: '{}'", token.trim()))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start = parse_page_number(start, "page range start")?;
                let end = parse_page_number(end, "page range end")?;
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                pages.insert(parse_page_number(token, "page number")?);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Pages to read; `None` reads every page.
    pub pages: Option<PageSelection>,
    pub header_mode: HeaderMode,
    pub quality_mode: QualityMode,
    /// Minimum cells a line needs to count as a table row. Must be at least 2.
    pub min_cols: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            header_mode: HeaderMode::AutoDetect,
            quality_mode: QualityMode::BestEffort,
            min_cols: 2,
        }
    }
}
