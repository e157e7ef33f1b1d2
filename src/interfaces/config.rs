use crate::domain::audit::ThresholdTable;
use crate::error::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Loads an audit threshold table from a JSON file.
///
/// The file holds an array of `{"level": 1, "min_amount": "0"}` objects and
/// is validated the same way as a table built in code.
pub fn load_thresholds<P: AsRef<Path>>(path: P) -> Result<ThresholdTable> {
    let file = File::open(path)?;
    let table = serde_json::from_reader(BufReader::new(file))?;
    Ok(table)
}
