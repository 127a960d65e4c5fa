//! Field mapping from a (list, item, course-code record) triple to one
//! output row.

use rl_model::{Authors, CourseCodeRecord, Item, ReadingList, Resource, Section};

use crate::columns::{
    CITATION_STATUS, COL_CITATION_END_PAGE, COL_CITATION_START_PAGE, COLUMN_COUNT, LIST_STATUS,
    LIST_VISIBILITY, RL_STATUS,
};

/// Build the 41 output fields for one item under one course-code record.
///
/// `sections` is the item's enclosing section chain, nearest first, as
/// produced by the list walk.
pub fn build_row(
    list: &ReadingList,
    item: &Item,
    sections: &[&Section],
    record: &CourseCodeRecord,
    owner_username: &str,
) -> Vec<String> {
    let resource = item.resource.as_ref();
    let mut row = Vec::with_capacity(COLUMN_COUNT);

    // course_code .. Searchable id3
    row.push(record.code.clone());
    row.push(record.section_id.clone());
    row.push(record.search_id1.clone());
    row.push(record.search_id2.clone());
    row.push(record.search_id3.clone());
    // Reading_list_code
    row.push(reading_list_code(list, record));
    // Reading list name / description
    row.push(list.name.clone());
    row.push(opt(&list.description));
    // Reading lists Status / RLStatus / visibility
    row.push(LIST_STATUS.to_string());
    row.push(RL_STATUS.to_string());
    row.push(LIST_VISIBILITY.to_string());
    // owner_user_name
    row.push(owner_username.to_string());
    // section_name / section_description / section dates
    row.push(section_name(sections));
    row.push(section_description(sections));
    row.push(String::new());
    row.push(String::new());
    // citation_secondary_type / citation_status / citation_tags
    row.push(citation_secondary_type(resource));
    row.push(CITATION_STATUS.to_string());
    row.push(citation_tags(item));

    match resource {
        Some(resource) => {
            // citation_originating_system_id
            row.push(opt(&resource.citation_local_control_number));
            // citation_title falls back to the item title
            row.push(
                resource
                    .citation_title
                    .clone()
                    .or_else(|| item.title.clone())
                    .unwrap_or_default(),
            );
            row.push(opt(&resource.journal_title));
            row.push(citation_authors(resource));
            row.push(opt(&resource.citation_date));
            row.push(opt(&resource.citation_edition));
            // The 10-digit ISBN is preferred; the 13-digit form is the
            // fallback.
            row.push(
                resource
                    .citation_isbn10
                    .clone()
                    .or_else(|| resource.citation_isbn13.clone())
                    .unwrap_or_default(),
            );
            row.push(opt(&resource.citation_issn));
            row.push(opt(&resource.citation_place_of_publication));
            row.push(opt(&resource.citation_publisher));
            row.push(opt(&resource.citation_volume));
            row.push(opt(&resource.citation_issue));
            row.push(opt(&resource.citation_page));
            row.push(opt(&resource.citation_page_start));
            row.push(opt(&resource.citation_page_end));
            row.push(opt(&resource.citation_doi));
            row.push(opt(&resource.chapter_title));
            row.push(opt(&resource.citation_url));
        }
        None => {
            row.push(opt(&item.local_control_number));
            row.push(opt(&item.title));
            for _ in 21..=36 {
                row.push(String::new());
            }
        }
    }

    // The downstream import does not consume split page ranges.
    row[COL_CITATION_START_PAGE] = String::new();
    row[COL_CITATION_END_PAGE] = String::new();

    // citation_note / additional_person_name / citation_public_note /
    // external_system_id (the two blank columns are reserved)
    row.push(opt(&item.library_note));
    row.push(String::new());
    row.push(opt(&item.student_note));
    row.push(String::new());

    debug_assert_eq!(row.len(), COLUMN_COUNT);
    row
}

/// The list code column: `mnemonic_year` when the course resolved, the
/// list's URI code otherwise.
fn reading_list_code(list: &ReadingList, record: &CourseCodeRecord) -> String {
    match &list.time_period {
        Some(period) if !record.is_unknown() => {
            format!("{}_{}", record.mnemonic, period.year)
        }
        _ => list.code().to_string(),
    }
}

/// Concatenate the enclosing sections furthest-to-nearest. The walk hands
/// them over nearest-first, so the chain is reversed here.
fn section_name(sections: &[&Section]) -> String {
    let names: Vec<&str> = sections.iter().rev().map(|s| s.name.as_str()).collect();
    names.join(" - ")
}

/// The description of the nearest enclosing section that has one.
fn section_description(sections: &[&Section]) -> String {
    sections
        .iter()
        .find_map(|section| section.description.clone())
        .unwrap_or_default()
}

/// Last segment of the resource's slash-delimited type path, spaces
/// removed, upper-cased.
fn citation_secondary_type(resource: Option<&Resource>) -> String {
    let Some(path) = resource.and_then(|r| r.type_path.as_deref()) else {
        return String::new();
    };
    let last = path.rsplit('/').next().unwrap_or(path);
    last.replace(' ', "").to_uppercase()
}

/// Tags inferred from the item's importance. At most one tag today; the
/// joined form leaves room for section-derived tags.
fn citation_tags(item: &Item) -> String {
    let mut tags: Vec<&str> = Vec::new();
    let importance = item.importance.as_deref().map(str::to_lowercase);
    match importance.as_deref() {
        Some("essential") => tags.push("ESS"),
        Some("optional") => tags.push("OPT"),
        Some("recommended") => tags.push("REC"),
        Some("suggested for student purchase") => tags.push("SSP"),
        _ => {}
    }
    tags.join(",")
}

fn citation_authors(resource: &Resource) -> String {
    match &resource.authors {
        None => String::new(),
        Some(Authors::One(author)) => author.clone(),
        Some(Authors::Many(authors)) => authors.join("; "),
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
