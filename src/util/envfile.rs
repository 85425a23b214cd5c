use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

fn unquote(val: &str) -> &str {
    let quoted = val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')));
    if quoted { &val[1..val.len() - 1] } else { val }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped; lines
/// without `=` are reported on stderr and ignored. This runs before the logger
/// is installed, so it cannot use `log`.
pub fn parse_env_str(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (idx, line) in content.lines().enumerate() {
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        match s.split_once('=') {
            Some((key, val)) => {
                map.insert(key.trim().to_string(), unquote(val.trim()).to_string());
            }
            None => eprintln!("Warning: ignoring .env line {} without '=': {}", idx + 1, line),
        }
    }
    map
}

/// Parse a .env file without touching the process environment. A missing
/// file yields an empty map.
pub fn parse_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    Ok(parse_env_str(&fs::read_to_string(path)?))
}

/// Load `.env` from the working directory. Variables already set win.
pub fn load_dotenv_if_present() -> Result<()> {
    for (k, v) in parse_env_file(Path::new(".env"))? {
        if std::env::var_os(&k).is_none() {
            unsafe {
                std::env::set_var(&k, &v);
            }
        }
    }
    Ok(())
}

pub fn write_env_template(path: &str) -> Result<()> {
    let mut f = fs::File::create(path)?;
    let template = r#"# name_reconcile environment configuration template
# Copy this file to .env. Command line flags override these values.

# Comma-separated input files, processed in order
#NAME_RECONCILE_TEXT=logs/day1.txt,logs/day2.txt
#NAME_RECONCILE_REFERENCE=hcs/cards.xls

# Output directory for partition files, issuance workbook and run summary
#NAME_RECONCILE_OUT_DIR=out

# Token that precedes a cardholder name in the log
#NAME_RECONCILE_MARKER=NPR

# drop | report (report writes unmatched_names.csv)
#NAME_RECONCILE_UNMATCHED=drop

# Optional JSON config file (column mapping etc.)
#NAME_RECONCILE_CONFIG=name_reconcile.json

# Logging: RUST_LOG filter, or NAME_RECONCILE_TRACING=1 for tracing output
#RUST_LOG=info
#NAME_RECONCILE_TRACING=0
"#;
    f.write_all(template.as_bytes())?;
    Ok(())
}
