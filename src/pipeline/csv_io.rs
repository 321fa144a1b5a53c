use std::io::{Read, Write};

use crate::constants::raw;
use crate::error::Result;
use crate::pipeline::processing::{EnrichedRecord, OutputLayout};
use crate::types::RawApprovalRecord;

/// Read a header-keyed raw approvals table.
///
/// Short rows are kept; their missing columns read as empty. Extra trailing
/// fields without a header are ignored.
pub fn read_raw_csv<R: Read>(reader: R) -> Result<Vec<RawApprovalRecord>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .enumerate()
                .map(|(i, column)| (column, record.get(i).unwrap_or_default()))
                .collect::<RawApprovalRecord>(),
        );
    }
    Ok(rows)
}

/// Write raw rows using the flattener's column order
pub fn write_raw_csv<W: Write>(records: &[RawApprovalRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(raw::HEADER)?;
    for record in records {
        wtr.write_record(raw::HEADER.iter().map(|column| record.get(column)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the enriched table; the header is always written, even with no rows
pub fn write_enriched_csv<W: Write>(
    records: &[EnrichedRecord],
    layout: OutputLayout,
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(layout.header())?;
    for record in records {
        wtr.write_record(record.row(layout).iter().map(|cell| cell.as_bytes()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn enriched_csv_bytes(records: &[EnrichedRecord], layout: OutputLayout) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_enriched_csv(records, layout, &mut buf)?;
    Ok(buf)
}

pub fn raw_csv_bytes(records: &[RawApprovalRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_raw_csv(records, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::enrich;

    #[test]
    fn raw_rows_survive_write_then_read() {
        let rows = vec![
            RawApprovalRecord::new()
                .with(raw::TITLE, "CDC, BDD :1")
                .with(raw::DESCRIPTION, "línea 1\nlínea \"2\""),
            RawApprovalRecord::new().with(raw::TITLE, "VPN"),
        ];

        let bytes = raw_csv_bytes(&rows).unwrap();
        let back = read_raw_csv(bytes.as_slice()).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back[0].get(raw::TITLE), "CDC, BDD :1");
        assert_eq!(back[0].get(raw::DESCRIPTION), "línea 1\nlínea \"2\"");
        assert_eq!(back[1].get(raw::OWNER), "");
    }

    #[test]
    fn short_rows_read_as_empty_columns() {
        let text = "id,title,description,owner\n1,CDC BDD :136\n2,VPN,x,y\n";
        let rows = read_raw_csv(text.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(raw::TITLE), "CDC BDD :136");
        assert_eq!(rows[0].get(raw::DESCRIPTION), "");
        assert_eq!(rows[0].get(raw::OWNER), "");
        assert_eq!(rows[1].get(raw::OWNER), "y");
    }

    #[test]
    fn header_written_for_empty_table() {
        let bytes = enriched_csv_bytes(&[], OutputLayout::Standard).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text.trim_end(),
            "Title,Clean Title,Ticket ID,Details,Status,Source,Create at,Completed at,\
             Year,Month,Day,Sent by,Custom responses,Classification Title,\
             Classification Title Micro,Classification Source"
        );
    }

    #[test]
    fn every_row_has_every_column() {
        let records = vec![
            enrich(&RawApprovalRecord::new()),
            enrich(&RawApprovalRecord::new().with(raw::TITLE, "Cuenta genérica 7")),
        ];
        let bytes = enriched_csv_bytes(&records, OutputLayout::Standard).unwrap();

        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let header = rdr.headers().unwrap().clone();
        assert_eq!(header.len(), 16);

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == header.len()));
        assert_eq!(&rows[1][1], "Gestión de Identidades | Cuenta Genérica #7");
        assert_eq!(&rows[0][8], "");
    }
}
