//! Property-based tests for `ferret_core`.
//!
//! These verify invariants that should hold for all inputs: chunk
//! reassembly, position arithmetic under base offsets, and the noise
//! filter on matched text.

use std::io::Write;

use ferret_core::prelude::*;
use ferret_core::{ChunkedReader, RuleEngine};
use proptest::prelude::*;
use tempfile::NamedTempFile;

fn token_engine() -> RuleEngine {
    let rule = Rule {
        name: "token".to_string(),
        pattern: r"TOKEN_\d+".to_string(),
        engine: EngineChoice::Auto,
        sensitive: false,
        loaded: true,
        context_left: 0,
        context_right: 0,
        sample_code: String::new(),
    };
    let rules = RuleSet {
        groups: vec![RuleGroup {
            name: "g".to_string(),
            rules: vec![rule],
        }],
    };
    RuleEngine::new(&rules).unwrap()
}

proptest! {
    /// Concatenating all chunk frames reproduces the file, and frame
    /// offsets tile the byte range without gaps or overlap.
    #[test]
    fn chunk_frames_reassemble_exactly(
        content in "[a-z \n]{0,400}",
        chunk_size in 1_usize..64,
    ) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let frames: Vec<_> = ChunkedReader::open(file.path(), encoding_rs::UTF_8, chunk_size)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let joined: String = frames.iter().map(|f| f.content.as_str()).collect();
        prop_assert_eq!(&joined, &content);

        let mut offset = 0_u64;
        let mut line = 1_u32;
        for frame in &frames {
            prop_assert_eq!(frame.start_offset, offset);
            prop_assert_eq!(frame.start_line, line);
            offset += frame.content.len() as u64;
            line += u32::try_from(frame.content.matches('\n').count()).unwrap();
        }
        prop_assert_eq!(offset, content.len() as u64);
    }

    /// A match's absolute position is the base offset plus its local byte
    /// offset, and its line the base line plus preceding newlines.
    #[test]
    fn positions_shift_with_base_offsets(
        prefix in "[a-z \n]{0,120}",
        suffix in "[a-z \n]{0,60}",
        base_offset in 0_u64..1_000_000,
        base_line in 1_u32..10_000,
    ) {
        let content = format!("{prefix}TOKEN_12345{suffix}");
        let engine = token_engine();

        let matches = engine.apply(&content, "f.txt", base_offset, base_line);

        prop_assert_eq!(matches.len(), 1);
        prop_assert_eq!(matches[0].position, base_offset + prefix.len() as u64);
        let newlines = u32::try_from(prefix.matches('\n').count()).unwrap();
        prop_assert_eq!(matches[0].line_number, base_line + newlines);
    }

    /// Every emitted match survives the noise filter and is contained in
    /// its own context.
    #[test]
    fn matches_are_long_enough_and_inside_context(content in "[ -~\n]{0,300}") {
        let rule = Rule {
            name: "word".to_string(),
            pattern: r"[a-z]+".to_string(),
            engine: EngineChoice::Auto,
            sensitive: true,
            loaded: true,
            context_left: 0,
            context_right: 0,
            sample_code: String::new(),
        };
        let rules = RuleSet {
            groups: vec![RuleGroup { name: "g".to_string(), rules: vec![rule] }],
        };
        let engine = RuleEngine::new(&rules).unwrap();

        for m in engine.apply(&content, "f.txt", 0, 1) {
            prop_assert!(m.matched.trim().len() > 5);
            prop_assert!(m.context.contains(&m.matched));
        }
    }

    /// Scanning the same content twice produces identical results.
    #[test]
    fn apply_is_deterministic(content in "[ -~\n]{0,300}") {
        let engine = token_engine();
        let first = engine.apply(&content, "f.txt", 0, 1);
        let second = engine.apply(&content, "f.txt", 0, 1);
        prop_assert_eq!(first, second);
    }
}
