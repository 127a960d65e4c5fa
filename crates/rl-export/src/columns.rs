//! The fixed 41-column import-file schema.

/// Column headings, in output order. The downstream import rejects files
/// whose header deviates from these literals.
pub const HEADER: [&str; 41] = [
    "course_code",
    "Section id",
    "Searchable id1",
    "Searchable id2",
    "Searchable id3",
    "Reading_list_code",
    "Reading list name",
    "Reading List Description",
    "Reading lists Status",
    "RLStatus",
    "visibility",
    "owner_user_name",
    "section_name",
    "section_description",
    "section_start_date",
    "section_end_date",
    "citation_secondary_type",
    "citation_status",
    "citation_tags",
    "citation_originating_system_id",
    "citation_title",
    "citation_journal_title",
    "citation_author",
    "citation_publication_date",
    "citation_edition",
    "citation_isbn",
    "citation_issn",
    "citation_place_of_publication",
    "citation_publisher",
    "citation_volume",
    "citation_issue",
    "citation_pages",
    "citation_start_page",
    "citation_end_page",
    "citation_doi",
    "citation_chapter",
    "citation_source",
    "citation_note",
    "additional_person_name",
    "citation_public_note",
    "external_system_id",
];

/// Number of output columns.
pub const COLUMN_COUNT: usize = HEADER.len();

// Fixed status values stamped on every row; the import flow moves rows out
// of these states after review.
pub const LIST_STATUS: &str = "BeingPrepared";
pub const RL_STATUS: &str = "DRAFT";
pub const LIST_VISIBILITY: &str = "RESTRICTED";
pub const CITATION_STATUS: &str = "BeingPrepared";

pub(crate) const COL_CITATION_START_PAGE: usize = 32;
pub(crate) const COL_CITATION_END_PAGE: usize = 33;
