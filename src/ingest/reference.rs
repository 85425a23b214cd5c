use std::collections::HashMap;
use std::sync::LazyLock;

use log::{error, info};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ReferenceError;
use crate::models::{InputFile, ReferenceRecord, ReferenceTable};

// Line breaks, or any run of two or more whitespace characters, read as one space.
static CELL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+|\s{2,}").expect("cell whitespace pattern"));

fn clean_cell(text: &str) -> String {
    CELL_WS.replace_all(text, " ").trim().to_string()
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

/// Rows of one table in document order, skipping nested tables. The flag is
/// true for rows inside `<thead>`.
fn table_rows(table: ElementRef<'_>) -> Vec<(ElementRef<'_>, bool)> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push((child, false)),
            section @ ("thead" | "tbody" | "tfoot") => {
                let in_head = section == "thead";
                rows.extend(
                    child_elements(child)
                        .filter(|r| r.value().name() == "tr")
                        .map(|r| (r, in_head)),
                );
            }
            _ => {}
        }
    }
    rows
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    child_elements(row)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .map(|c| clean_cell(&c.text().collect::<String>()))
        .collect()
}

/// Parse the first `<table>` of an HTML document. Its first body row becomes
/// the header and is removed from the data.
pub fn parse_reference_html(file: &str, html: &str) -> Result<ReferenceTable, ReferenceError> {
    let parse_err = |reason: String| ReferenceError::Parse {
        file: file.to_string(),
        reason,
    };
    let table_sel =
        Selector::parse("table").map_err(|e| parse_err(format!("bad selector: {e}")))?;
    let doc = Html::parse_document(html);
    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| parse_err("no tables found".into()))?;

    let mut body = table_rows(table)
        .into_iter()
        .filter(|(_, in_head)| !in_head)
        .map(|(row, _)| row_cells(row));
    let columns = body
        .next()
        .ok_or_else(|| parse_err("table has no header row".into()))?;

    let records = body
        .map(|cells| {
            let fields: HashMap<String, String> = columns
                .iter()
                .zip(cells)
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v))
                .collect();
            ReferenceRecord { fields }
        })
        .collect();

    // append() also folds repeated header names into one column
    let mut table = ReferenceTable::default();
    table.append(ReferenceTable {
        columns,
        records,
    });
    Ok(table)
}

#[derive(Debug, Default)]
pub struct ReferenceLoad {
    pub table: ReferenceTable,
    pub loaded: Vec<String>,
    pub failures: Vec<ReferenceError>,
}

/// Load and concatenate every reference file in order. A file that fails to
/// decode or parse is reported and left out.
pub fn load_reference_tables(files: &[InputFile]) -> ReferenceLoad {
    let mut load = ReferenceLoad::default();
    for file in files {
        let parsed = std::str::from_utf8(&file.bytes)
            .map_err(|source| ReferenceError::Decode {
                file: file.name.clone(),
                source,
            })
            .and_then(|html| parse_reference_html(&file.name, html));
        match parsed {
            Ok(table) => {
                info!("Successfully processed {} ({} rows)", file.name, table.len());
                load.table.append(table);
                load.loaded.push(file.name.clone());
            }
            Err(e) => {
                error!("Error processing {}: {}", file.name, e);
                load.failures.push(e);
            }
        }
    }
    if !load.loaded.is_empty() {
        info!(
            "Loaded {} rows from {} reference file(s)",
            load.table.len(),
            load.loaded.len()
        );
    }
    load
}
