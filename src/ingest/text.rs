use log::{debug, error, info};
use regex::Regex;

use crate::error::{ConfigError, ExtractError};
use crate::models::{InputFile, NameCandidate};

/// Finds `<marker>` followed by up to four whitespace characters and a run of
/// upper-case letters, periods and spaces.
#[derive(Debug, Clone)]
pub struct NameExtractor {
    re: Regex,
}

impl NameExtractor {
    pub const DEFAULT_MARKER: &'static str = "NPR";

    pub fn new(marker: &str) -> Result<Self, ConfigError> {
        if marker.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "matching.marker",
            });
        }
        let pattern = format!(r"{}\s{{0,4}}([A-Z][A-Z.\s]+)", regex::escape(marker));
        let re = Regex::new(&pattern).map_err(|e| ConfigError::InvalidValue {
            field: "matching.marker",
            reason: e.to_string(),
        })?;
        Ok(Self { re })
    }

    /// Every trimmed name on one line, in order of appearance.
    pub fn names_in_line<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.re
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Candidates for a whole text, numbered from `start`. A line without a
    /// marker yields one absent candidate.
    pub fn extract_text(&self, text: &str, start: usize) -> Vec<NameCandidate> {
        let mut out = Vec::new();
        for line in split_lines(text) {
            let before = out.len();
            for name in self.names_in_line(line) {
                out.push(NameCandidate::present(start + out.len(), name));
            }
            if out.len() == before {
                out.push(NameCandidate::absent(start + out.len()));
            }
        }
        out
    }
}

/// Line boundaries: `\n`, `\r`, `\r\n`, vertical tab, form feed, the file/group/record
/// separators, NEL, and the Unicode line and paragraph separators.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split into lines, without a trailing empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.char_indices().find(|(_, c)| LINE_BREAKS.contains(c)) {
            Some((i, c)) => {
                lines.push(&rest[..i]);
                let skip = if rest[i..].starts_with("\r\n") { 2 } else { c.len_utf8() };
                rest = &rest[i + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

#[derive(Debug, Default)]
pub struct TextLoad {
    pub candidates: Vec<NameCandidate>,
    pub loaded: Vec<String>,
    pub failures: Vec<ExtractError>,
}

impl TextLoad {
    pub fn present_count(&self) -> usize {
        self.candidates.iter().filter(|c| !c.is_absent()).count()
    }
}

/// Extract candidates from every file in order. Files that are not UTF-8 are
/// reported and skipped.
pub fn extract_candidates(extractor: &NameExtractor, files: &[InputFile]) -> TextLoad {
    let mut load = TextLoad::default();
    for file in files {
        let text = match std::str::from_utf8(&file.bytes) {
            Ok(t) => t,
            Err(source) => {
                let err = ExtractError::Decode {
                    file: file.name.clone(),
                    source,
                };
                error!("Error processing {}: {}", file.name, err);
                load.failures.push(err);
                continue;
            }
        };
        let found = extractor.extract_text(text, load.candidates.len());
        debug!("{}: {} candidate rows", file.name, found.len());
        load.candidates.extend(found);
        load.loaded.push(file.name.clone());
    }
    info!(
        "Extracted {} names ({} with a marker) from {} text file(s)",
        load.candidates.len(),
        load.present_count(),
        load.loaded.len()
    );
    load
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npr() -> NameExtractor {
        NameExtractor::new(NameExtractor::DEFAULT_MARKER).expect("default marker")
    }

    fn raw(c: &[NameCandidate]) -> Vec<Option<&str>> {
        c.iter().map(|c| c.raw.as_deref()).collect()
    }

    #[test]
    fn marker_lines_and_absent_sentinel() {
        let ex = npr();
        let got = ex.extract_text("NPR JOHN SMITH\nno marker here\nNPR  MARY A JONES\n", 0);
        assert_eq!(
            raw(&got),
            vec![Some("JOHN SMITH"), None, Some("MARY A JONES")]
        );
        assert_eq!(got.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn up_to_four_spaces_after_marker() {
        let ex = npr();
        assert_eq!(ex.names_in_line("NPR    J. DOE").collect::<Vec<_>>(), vec!["J. DOE"]);
        assert_eq!(ex.names_in_line("NPRJANE ROE").collect::<Vec<_>>(), vec!["JANE ROE"]);
        assert!(ex.names_in_line("NPR     FIVE SPACES").next().is_none());
    }

    #[test]
    fn name_run_stops_at_lowercase_or_digit() {
        let ex = npr();
        let names: Vec<_> = ex.names_in_line("TXN 0042 NPR ANNA K. LEE 12/05 ok").collect();
        assert_eq!(names, vec!["ANNA K. LEE"]);
        assert!(ex.names_in_line("NPR john smith").next().is_none());
    }

    #[test]
    fn several_markers_on_one_line() {
        let ex = npr();
        let got = ex.extract_text("NPR ANN LEE, ref NPR BOB RAY", 5);
        assert_eq!(raw(&got), vec![Some("ANN LEE"), Some("BOB RAY")]);
        assert_eq!(got[1].index, 6);
    }

    #[test]
    fn custom_marker_is_literal() {
        let ex = NameExtractor::new("A.B").expect("marker");
        assert_eq!(ex.names_in_line("A.B TOM HILL").collect::<Vec<_>>(), vec!["TOM HILL"]);
        assert!(ex.names_in_line("AXB TOM HILL").next().is_none());
        assert!(NameExtractor::new("  ").is_err());
    }

    #[test]
    fn line_endings() {
        assert_eq!(split_lines("a\r\nb\rc\n"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn page_breaks_and_unicode_separators_end_lines() {
        let ex = npr();
        for sep in ["\x0c", "\x0b", "\u{85}", "\u{2028}", "\u{2029}", "\x1e"] {
            let text = format!("NPR JOHN SMITH{sep}NPR MARY JONES");
            let got = ex.extract_text(&text, 0);
            assert_eq!(raw(&got), vec![Some("JOHN SMITH"), Some("MARY JONES")], "{sep:?}");
        }
        // A form feed right after a newline is a line of its own.
        let got = ex.extract_text("NPR JOHN SMITH\n\x0cNPR MARY JONES", 0);
        assert_eq!(
            raw(&got),
            vec![Some("JOHN SMITH"), None, Some("MARY JONES")]
        );
    }

    #[test]
    fn files_concatenate_in_upload_order() {
        let ex = npr();
        let files = vec![
            InputFile::new("f1.txt", "NPR LINE ONE\nNPR LINE TWO\n"),
            InputFile::new("f2.txt", "NPR LINE THREE\n"),
        ];
        let load = extract_candidates(&ex, &files);
        assert_eq!(
            raw(&load.candidates),
            vec![Some("LINE ONE"), Some("LINE TWO"), Some("LINE THREE")]
        );
        assert_eq!(load.loaded, vec!["f1.txt", "f2.txt"]);
    }

    #[test]
    fn undecodable_file_is_skipped() {
        let ex = npr();
        let files = vec![
            InputFile::new("bad.txt", vec![0xff, 0xfe, b'N']),
            InputFile::new("good.txt", "NPR OK NAME"),
        ];
        let load = extract_candidates(&ex, &files);
        assert_eq!(load.failures.len(), 1);
        assert!(matches!(&load.failures[0], ExtractError::Decode { file, .. } if file == "bad.txt"));
        assert_eq!(raw(&load.candidates), vec![Some("OK NAME")]);
        assert_eq!(load.candidates[0].index, 0);
    }
}
