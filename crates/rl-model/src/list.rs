//! The reading-list object model.
//!
//! Lists are resolved read-only from an external source and discarded once
//! their rows are written. Items live inside arbitrarily nested sections;
//! the walk contract ([`ReadingList::for_each_item`]) presents each item
//! together with its enclosing sections in nearest-to-furthest order.

use crate::ids::ModuleCode;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReadingList {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_period: Option<TimePeriod>,
    #[serde(default)]
    pub owner: Vec<Person>,
    #[serde(default)]
    pub creator: Vec<Person>,
    /// Course modules this list is attached to. Upstream data may carry
    /// null entries; callers discard them.
    #[serde(default)]
    pub modules: Vec<Option<Module>>,
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Items attached directly to the list, outside any section.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl ReadingList {
    /// The list code: the last path segment of the list URI.
    pub fn code(&self) -> &str {
        let trimmed = self.uri.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Visit every item in document order, depth-first through the section
    /// tree. The section slice is ordered nearest-to-furthest: the item's
    /// immediate section first, the outermost last. Top-level items get an
    /// empty slice.
    pub fn for_each_item<'a, E, F>(&'a self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&'a Item, &[&'a Section]) -> Result<(), E>,
    {
        for item in &self.items {
            f(item, &[])?;
        }
        let mut chain: Vec<&Section> = Vec::new();
        for section in &self.sections {
            walk_section(section, &mut chain, &mut f)?;
        }
        Ok(())
    }
}

fn walk_section<'a, E, F>(
    section: &'a Section,
    chain: &mut Vec<&'a Section>,
    f: &mut F,
) -> Result<(), E>
where
    F: FnMut(&'a Item, &[&'a Section]) -> Result<(), E>,
{
    // Nearest-first: the section being entered goes to the front.
    chain.insert(0, section);
    for item in &section.items {
        f(item, chain.as_slice())?;
    }
    for child in &section.sections {
        walk_section(child, chain, f)?;
    }
    chain.remove(0);
    Ok(())
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimePeriod {
    pub year: i32,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Module {
    pub code: ModuleCode,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub local_control_number: Option<String>,
    /// Free-text importance tag source, e.g. "Essential".
    #[serde(default)]
    pub importance: Option<String>,
    #[serde(default)]
    pub library_note: Option<String>,
    #[serde(default)]
    pub student_note: Option<String>,
    #[serde(default)]
    pub resource: Option<Resource>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Resource {
    /// Slash-delimited taxonomy path, e.g. `Document/Book/Chapter`.
    #[serde(default, rename = "type")]
    pub type_path: Option<String>,
    #[serde(default)]
    pub citation_title: Option<String>,
    #[serde(default)]
    pub citation_local_control_number: Option<String>,
    #[serde(default)]
    pub journal_title: Option<String>,
    #[serde(default)]
    pub authors: Option<Authors>,
    #[serde(default)]
    pub citation_date: Option<String>,
    #[serde(default)]
    pub citation_edition: Option<String>,
    #[serde(default)]
    pub citation_isbn10: Option<String>,
    #[serde(default)]
    pub citation_isbn13: Option<String>,
    #[serde(default)]
    pub citation_issn: Option<String>,
    #[serde(default)]
    pub citation_place_of_publication: Option<String>,
    #[serde(default)]
    pub citation_publisher: Option<String>,
    #[serde(default)]
    pub citation_volume: Option<String>,
    #[serde(default)]
    pub citation_issue: Option<String>,
    #[serde(default)]
    pub citation_page: Option<String>,
    #[serde(default)]
    pub citation_page_start: Option<String>,
    #[serde(default)]
    pub citation_page_end: Option<String>,
    #[serde(default)]
    pub citation_doi: Option<String>,
    #[serde(default)]
    pub chapter_title: Option<String>,
    #[serde(default)]
    pub citation_url: Option<String>,
}

/// Resource authorship, either a single display string or a sequence.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Authors {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Vec<String>,
}
