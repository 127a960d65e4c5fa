//! Course-code records injected into each output row.

/// Mnemonic carried by the unknown sentinel record.
pub const UNKNOWN_MNEMONIC: &str = "UNKNOWN";

/// The identifying tuple associating an output row with a course/section
/// offering. One catalogue-feed row produces one record; a (module, year)
/// pair may own several records, one per cohort.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CourseCodeRecord {
    pub code: String,
    pub section_id: String,
    pub search_id1: String,
    pub search_id2: String,
    pub search_id3: String,
    pub mnemonic: String,
}

impl CourseCodeRecord {
    /// The fixed fallback record used when no module, no time period, or no
    /// matching catalogue entry exists.
    pub fn unknown() -> Self {
        Self {
            code: "unknown".to_string(),
            section_id: "1".to_string(),
            search_id1: String::new(),
            search_id2: String::new(),
            search_id3: String::new(),
            mnemonic: UNKNOWN_MNEMONIC.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.mnemonic == UNKNOWN_MNEMONIC
    }
}
