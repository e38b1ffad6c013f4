/// Parser for the gcov intermediate text format (`gcov -i`).
///
/// Reference: https://gcc.gnu.org/onlinedocs/gcc/Invoking-Gcov.html
///
/// Key records:
///   file:<source file name>
///   function:<start line>,<end line>,<execution count>,<function name>
///   lcount:<line number>,<execution count>,<has unexecuted block>
///
/// Everything else (`version:`, `branch:`, ...) is skipped.
use crate::error::{GcovError, Result};
use crate::model::{DumpData, FileRecords, FunctionRecord, LineRecord};

use super::Parser;

/// gcov intermediate format parser.
pub struct GcovParser;

impl Parser for GcovParser {
    fn parse(&self, input: &[u8]) -> Result<DumpData> {
        parse(input)
    }
}

/// Parse one gcov intermediate dump from raw bytes.
pub fn parse(input: &[u8]) -> Result<DumpData> {
    let text = String::from_utf8_lossy(input);
    let mut data = DumpData::new();
    let mut current: Option<(String, FileRecords)> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;

        // Split on first ':'
        let (tag, value) = match raw_line.split_once(':') {
            Some(pair) => pair,
            None => continue,
        };

        match tag {
            "file" => {
                if let Some((path, records)) = current.take() {
                    flush(&mut data, path, records);
                }
                current = Some((value.trim().to_string(), FileRecords::default()));
            }
            "function" => {
                if let Some((_, records)) = current.as_mut() {
                    records.functions.push(parse_function(value, line_no)?);
                }
            }
            "lcount" => {
                if let Some((_, records)) = current.as_mut() {
                    records.lines.push(parse_lcount(value, line_no)?);
                }
            }
            _ => {}
        }
    }

    if let Some((path, records)) = current.take() {
        flush(&mut data, path, records);
    }

    Ok(data)
}

/// A file mentioned twice in one dump keeps both sets of records.
fn flush(data: &mut DumpData, path: String, records: FileRecords) {
    let entry = data.entry(path).or_default();
    entry.functions.extend(records.functions);
    entry.lines.extend(records.lines);
}

fn parse_function(value: &str, line: usize) -> Result<FunctionRecord> {
    let parts: Vec<&str> = value.splitn(4, ',').collect();
    if parts.len() != 4 {
        return Err(GcovError::Parse {
            line,
            message: format!("expected 'start,stop,count,name' in function record, got '{value}'"),
        });
    }
    Ok(FunctionRecord {
        start_line: number(parts[0], line, "function start line")?,
        end_line: number(parts[1], line, "function end line")?,
        invocation_count: number(parts[2], line, "function execution count")?,
        name: parts[3].trim().to_string(),
    })
}

fn parse_lcount(value: &str, line: usize) -> Result<LineRecord> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        return Err(GcovError::Parse {
            line,
            message: format!(
                "expected 'line,count,has_unexecuted_block' in lcount record, got '{value}'"
            ),
        });
    }
    let unexecuted: u32 = number(parts[2], line, "unexecuted block flag")?;
    Ok(LineRecord {
        line_number: number(parts[0], line, "line number")?,
        hit_count: number(parts[1], line, "execution count")?,
        has_unexecuted_block: unexecuted != 0,
    })
}

fn number<T: std::str::FromStr>(field: &str, line: usize, what: &str) -> Result<T> {
    let field = field.trim();
    field.parse::<T>().map_err(|_| GcovError::Parse {
        line,
        message: format!("invalid {what}: '{field}'"),
    })
}
