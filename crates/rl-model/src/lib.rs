pub mod collab;
pub mod course;
pub mod error;
pub mod ids;
pub mod list;

pub use collab::{
    DirectoryAttribute, DirectoryEntry, DirectoryService, DirectoryServiceError, EmailSelector,
    KeyValueStore, ListSource,
};
pub use course::{CourseCodeRecord, UNKNOWN_MNEMONIC};
pub use error::{ModelError, Result};
pub use ids::ModuleCode;
pub use list::{Authors, Item, Module, Person, ReadingList, Resource, Section, TimePeriod};
