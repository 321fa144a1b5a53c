// Pipeline processing: classification and normalization of approval rows

pub mod dates;
pub mod details;
pub mod enrich;
pub mod source;
pub mod title;

pub use dates::{parse_calendar, CalendarParts};
pub use details::{extract_assignee, extract_metadata, DetailMetadata};
pub use enrich::{
    enrich, AreaSource, ClassificationOptions, Column, EnrichedRecord, Enricher, OutputLayout,
    RecordEnricher,
};
pub use source::{classify_source, AutomationRule, SourceClassifier};
pub use title::{classify_title, ClassificationResult, TicketIdPolicy, TitleClassifier};
