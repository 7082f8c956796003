//! Units command - list built-in units

use crate::builtin::UNITS;
use console::style;

/// Execute the units command
pub fn execute() {
    let width = UNITS.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, description) in UNITS {
        println!(
            "{}  {}",
            style(format!("{:<width$}", name, width = width)).bold(),
            description
        );
    }
}
