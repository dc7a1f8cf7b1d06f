use log::warn;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Expands the given values into input lines. A value naming an existing
/// file is replaced by its lines. With no values, lines are taken from
/// stdin when `use_stdin` is set.
pub fn read_inputs(
    values: Vec<String>,
    use_stdin: bool,
    skip_empty: bool,
) -> Vec<String> {
    let mut lines = Vec::new();

    if values.is_empty() {
        if use_stdin {
            let stdin = io::stdin();
            lines.extend(stdin.lock().lines().filter_map(|l| l.ok()));
        }
    } else {
        for value in values {
            if !Path::new(&value).is_file() {
                lines.push(value);
                continue;
            }

            match File::open(&value) {
                Ok(file) => lines.extend(
                    BufReader::new(file).lines().filter_map(|l| l.ok()),
                ),
                Err(e) => warn!("Unable to read {}: {}", value, e),
            }
        }
    }

    if skip_empty {
        lines.retain(|l| !l.trim().is_empty());
    }

    return lines;
}
