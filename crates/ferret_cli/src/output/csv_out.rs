//! CSV output formatter for scan results.

use std::io::Write;

use ferret_core::Match;

use super::OutputKey;

/// Serialises matches as CSV with a header row of the selected keys.
pub fn write<W: Write>(writer: W, matches: &[Match], keys: &[OutputKey]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(keys.iter().map(|k| k.as_str()))?;
    for m in matches {
        csv_writer.write_record(keys.iter().map(|k| k.text_of(m)))?;
    }

    csv_writer.flush()?;
    Ok(())
}
