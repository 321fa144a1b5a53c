use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::dates::{parse_calendar, CalendarParts};
use super::details::{extract_assignee, extract_metadata};
use super::source::{AutomationRule, SourceClassifier};
use super::title::{ClassificationResult, TicketIdPolicy, TitleClassifier};
use crate::constants::raw;
use crate::types::RawApprovalRecord;

/// Where the "Classification Source" column is derived from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSource {
    /// Keyword classification of the owner field
    #[default]
    Owner,
    /// Requesting-area label found in the details text
    Details,
}

impl FromStr for AreaSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(AreaSource::Owner),
            "details" => Ok(AreaSource::Details),
            other => Err(format!(
                "unknown area source '{}' (expected owner or details)",
                other
            )),
        }
    }
}

impl fmt::Display for AreaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaSource::Owner => write!(f, "owner"),
            AreaSource::Details => write!(f, "details"),
        }
    }
}

/// Knobs that select between the historical classification variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationOptions {
    pub ticket_id: TicketIdPolicy,
    pub area_source: AreaSource,
    pub automation: AutomationRule,
}

/// A classified approval, ready to be written as one output row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub title: String,
    pub clean_title: String,
    pub classification: ClassificationResult,
    pub details: String,
    pub status: String,
    pub source: String,
    pub created_at: String,
    pub completed_at: String,
    pub calendar: CalendarParts,
    pub sent_by: String,
    pub custom_responses: String,
    pub classification_source: String,
}

/// Output columns. The header text is the wire name downstream reports use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    CleanTitle,
    CategoryMacro,
    CategoryMicro,
    TicketId,
    Details,
    Status,
    Source,
    CreatedAt,
    CompletedAt,
    Year,
    Month,
    Day,
    SentBy,
    CustomResponses,
    ClassificationTitle,
    ClassificationTitleMicro,
    ClassificationSource,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::CleanTitle => "Clean Title",
            Column::CategoryMacro => "Category_Macro",
            Column::CategoryMicro => "Category_Micro",
            Column::TicketId => "Ticket ID",
            Column::Details => "Details",
            Column::Status => "Status",
            Column::Source => "Source",
            Column::CreatedAt => "Create at",
            Column::CompletedAt => "Completed at",
            Column::Year => "Year",
            Column::Month => "Month",
            Column::Day => "Day",
            Column::SentBy => "Sent by",
            Column::CustomResponses => "Custom responses",
            Column::ClassificationTitle => "Classification Title",
            Column::ClassificationTitleMicro => "Classification Title Micro",
            Column::ClassificationSource => "Classification Source",
        }
    }
}

const STANDARD_COLUMNS: &[Column] = &[
    Column::Title,
    Column::CleanTitle,
    Column::TicketId,
    Column::Details,
    Column::Status,
    Column::Source,
    Column::CreatedAt,
    Column::CompletedAt,
    Column::Year,
    Column::Month,
    Column::Day,
    Column::SentBy,
    Column::CustomResponses,
    Column::ClassificationTitle,
    Column::ClassificationTitleMicro,
    Column::ClassificationSource,
];

const CATEGORY_COLUMNS: &[Column] = &[
    Column::Title,
    Column::CleanTitle,
    Column::CategoryMacro,
    Column::CategoryMicro,
    Column::TicketId,
    Column::Details,
    Column::Status,
    Column::Source,
    Column::CreatedAt,
    Column::CompletedAt,
    Column::Year,
    Column::Month,
    Column::Day,
    Column::SentBy,
    Column::CustomResponses,
    Column::ClassificationTitle,
    Column::ClassificationSource,
];

/// Column set of the published table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    #[default]
    Standard,
    /// Adds `Category_Macro`/`Category_Micro`, drops `Classification Title Micro`
    CategoryColumns,
}

impl OutputLayout {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            OutputLayout::Standard => STANDARD_COLUMNS,
            OutputLayout::CategoryColumns => CATEGORY_COLUMNS,
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns().iter().map(Column::header).collect()
    }
}

impl FromStr for OutputLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(OutputLayout::Standard),
            "category_columns" | "categories" => Ok(OutputLayout::CategoryColumns),
            other => Err(format!(
                "unknown output layout '{}' (expected standard or category_columns)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputLayout::Standard => write!(f, "standard"),
            OutputLayout::CategoryColumns => write!(f, "category_columns"),
        }
    }
}

fn number_cell<T: ToString>(value: Option<T>) -> Cow<'static, str> {
    value
        .map(|v| Cow::Owned(v.to_string()))
        .unwrap_or(Cow::Borrowed(""))
}

impl EnrichedRecord {
    /// Cell text for `column`; absent values render as the empty string
    pub fn cell(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Title => Cow::Borrowed(&self.title),
            Column::CleanTitle => Cow::Borrowed(&self.clean_title),
            Column::CategoryMacro | Column::ClassificationTitle => {
                Cow::Borrowed(&self.classification.macro_category)
            }
            Column::CategoryMicro | Column::ClassificationTitleMicro => {
                Cow::Borrowed(&self.classification.micro_category)
            }
            Column::TicketId => Cow::Borrowed(&self.classification.ticket_id),
            Column::Details => Cow::Borrowed(&self.details),
            Column::Status => Cow::Borrowed(&self.status),
            Column::Source => Cow::Borrowed(&self.source),
            Column::CreatedAt => Cow::Borrowed(&self.created_at),
            Column::CompletedAt => Cow::Borrowed(&self.completed_at),
            Column::Year => number_cell(self.calendar.year),
            Column::Month => number_cell(self.calendar.month),
            Column::Day => number_cell(self.calendar.day),
            Column::SentBy => Cow::Borrowed(&self.sent_by),
            Column::CustomResponses => Cow::Borrowed(&self.custom_responses),
            Column::ClassificationSource => Cow::Borrowed(&self.classification_source),
        }
    }

    /// All cells for a layout, in header order
    pub fn row(&self, layout: OutputLayout) -> Vec<Cow<'_, str>> {
        layout.columns().iter().map(|c| self.cell(*c)).collect()
    }
}

/// Trait for turning a raw approval row into its enriched form
pub trait Enricher {
    fn enrich(&self, row: &RawApprovalRecord) -> EnrichedRecord;
}

/// Combines the title, source, details and date components
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEnricher {
    titles: TitleClassifier,
    sources: SourceClassifier,
    area_source: AreaSource,
}

impl RecordEnricher {
    pub fn new(options: ClassificationOptions) -> Self {
        Self {
            titles: TitleClassifier::new(options.ticket_id),
            sources: SourceClassifier::new(options.automation),
            area_source: options.area_source,
        }
    }

    fn area(&self, row: &RawApprovalRecord) -> String {
        match self.area_source {
            AreaSource::Owner => self.sources.classify(row.get_opt(raw::OWNER)),
            AreaSource::Details => extract_metadata(row.get_opt(raw::DESCRIPTION)).requesting_area,
        }
    }
}

impl Enricher for RecordEnricher {
    fn enrich(&self, row: &RawApprovalRecord) -> EnrichedRecord {
        let classification = self.titles.classify(row.get_opt(raw::TITLE));
        let details = row.get(raw::DESCRIPTION);

        EnrichedRecord {
            title: row.get(raw::TITLE).to_string(),
            clean_title: classification.clean_title(),
            details: details.to_string(),
            status: row.get(raw::STATE).to_string(),
            source: row.get(raw::OWNER).to_string(),
            created_at: row.get(raw::CREATED).to_string(),
            completed_at: row.get(raw::COMPLETED).to_string(),
            calendar: parse_calendar(row.get_opt(raw::CREATED)),
            sent_by: extract_assignee(Some(details)).unwrap_or_default(),
            custom_responses: row.get(raw::RESPONSE_PROMPTS).to_string(),
            classification_source: self.area(row),
            classification,
        }
    }
}

/// Enrich one row with the default options
pub fn enrich(row: &RawApprovalRecord) -> EnrichedRecord {
    RecordEnricher::default().enrich(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> RawApprovalRecord {
        RawApprovalRecord::new()
            .with(raw::TITLE, "CDC BDD :136")
            .with(raw::OWNER, "Infraestructura Team")
            .with(raw::CREATED, "2025-01-02T10:00:00Z")
    }

    #[test]
    fn enriches_change_control_row() {
        let record = enrich(&sample_row());

        assert_eq!(record.clean_title, "Control de Cambios (CDC) | Base de Datos #136");
        assert_eq!(record.classification_source, "Infraestructura");
        assert_eq!(record.cell(Column::Year), "2025");
        assert_eq!(record.cell(Column::Month), "1");
        assert_eq!(record.cell(Column::Day), "2");
        assert_eq!(record.cell(Column::TicketId), "136");
        assert_eq!(record.sent_by, "");
    }

    #[test]
    fn missing_fields_render_empty() {
        let record = enrich(&RawApprovalRecord::new());

        assert_eq!(record.clean_title, "Otros | General #N/A");
        for column in OutputLayout::Standard.columns() {
            let expected_non_empty = matches!(
                column,
                Column::CleanTitle
                    | Column::TicketId
                    | Column::ClassificationTitle
                    | Column::ClassificationTitleMicro
            );
            assert_eq!(
                !record.cell(*column).is_empty(),
                expected_non_empty,
                "column {}",
                column.header()
            );
        }
    }

    #[test]
    fn passthrough_fields_are_verbatim() {
        let row = sample_row()
            .with(raw::DESCRIPTION, "Aprobar por ana@usfq.edu.ec, gracias")
            .with(raw::STATE, "completed")
            .with(raw::COMPLETED, "2025-01-03T08:00:00Z")
            .with(raw::RESPONSE_PROMPTS, "[\"Aprobar\"]");
        let record = enrich(&row);

        assert_eq!(record.title, "CDC BDD :136");
        assert_eq!(record.details, "Aprobar por ana@usfq.edu.ec, gracias");
        assert_eq!(record.status, "completed");
        assert_eq!(record.source, "Infraestructura Team");
        assert_eq!(record.completed_at, "2025-01-03T08:00:00Z");
        assert_eq!(record.custom_responses, "[\"Aprobar\"]");
        assert_eq!(record.sent_by, "ana@usfq.edu.ec");
    }

    #[test]
    fn details_area_source_uses_requesting_area() {
        let enricher = RecordEnricher::new(ClassificationOptions {
            area_source: AreaSource::Details,
            ..Default::default()
        });
        let row = sample_row().with(raw::DESCRIPTION, "QUIEN SOLICITA: Vicerrectorado*");

        assert_eq!(enricher.enrich(&row).classification_source, "Vicerrectorado");
        assert_eq!(enricher.enrich(&sample_row()).classification_source, "N/A");
    }

    #[test]
    fn layouts_have_expected_headers() {
        assert_eq!(
            OutputLayout::Standard.header(),
            vec![
                "Title",
                "Clean Title",
                "Ticket ID",
                "Details",
                "Status",
                "Source",
                "Create at",
                "Completed at",
                "Year",
                "Month",
                "Day",
                "Sent by",
                "Custom responses",
                "Classification Title",
                "Classification Title Micro",
                "Classification Source",
            ]
        );

        let alt = OutputLayout::CategoryColumns.header();
        assert_eq!(&alt[..5], &["Title", "Clean Title", "Category_Macro", "Category_Micro", "Ticket ID"]);
        assert!(!alt.contains(&"Classification Title Micro"));
        assert_eq!(alt.len(), 17);
    }

    #[test]
    fn row_follows_layout_order() {
        let record = enrich(&sample_row());
        let row = record.row(OutputLayout::CategoryColumns);

        assert_eq!(row.len(), OutputLayout::CategoryColumns.columns().len());
        assert_eq!(row[2], "Control de Cambios (CDC)");
        assert_eq!(row[3], "Base de Datos");
    }
}
