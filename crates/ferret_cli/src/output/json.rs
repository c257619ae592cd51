//! JSON output formatter for scan results.

use std::io::Write;

use ferret_core::Match;
use serde_json::{Map, Value};

use super::OutputKey;

/// Serialises matches as a pretty-printed JSON array, restricted to the
/// selected keys.
pub fn write<W: Write>(mut writer: W, matches: &[Match], keys: &[OutputKey]) -> anyhow::Result<()> {
    let records: Vec<Value> = matches.iter().map(|m| to_record(m, keys)).collect();

    serde_json::to_writer_pretty(&mut writer, &records)?;
    writeln!(writer)?;
    Ok(())
}

fn to_record(m: &Match, keys: &[OutputKey]) -> Value {
    let mut record = Map::with_capacity(keys.len());
    for key in keys {
        record.insert(key.as_str().to_string(), key.value_of(m));
    }
    Value::Object(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> Match {
        Match {
            file: "src/config.py".to_string(),
            group: "credentials".to_string(),
            rule_name: "api key".to_string(),
            matched: "API_KEY=abcdef123456".to_string(),
            context: "ctx API_KEY=abcdef123456 ctx".to_string(),
            position: 120,
            line_number: 8,
            sensitive: true,
        }
    }

    #[test]
    fn writes_all_fields_in_contract_order() {
        let mut out = Vec::new();
        write(&mut out, &[sample_match()], &OutputKey::ALL).unwrap();

        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["file"], "src/config.py");
        assert_eq!(json[0]["match"], "API_KEY=abcdef123456");
        assert_eq!(json[0]["position"], 120);
        assert_eq!(json[0]["sensitive"], true);
    }

    #[test]
    fn empty_match_list_writes_empty_array() {
        let mut out = Vec::new();
        write(&mut out, &[], &OutputKey::ALL).unwrap();

        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }
}
