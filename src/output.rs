//! Result reporting: machine-readable JSON on stdout, a short status
//! line on stderr.

use colored::Colorize;
use reconcile::SyncOutcome;
use serde_json::{Value, json};

/// Print the reconciliation result for one resource.
///
/// stdout carries exactly one JSON document, `{"changed", "object"}`,
/// so the command can be driven by automation; the human-facing line
/// goes to stderr.
pub fn emit(kind: &str, name: &str, outcome: &SyncOutcome, quiet: bool) {
    if !quiet {
        let marker = if outcome.changed {
            "~ changed".yellow()
        } else {
            "= unchanged".green()
        };
        eprintln!("{} {}/{}", marker, kind, name);
    }

    let object = outcome
        .object
        .clone()
        .map_or(Value::Null, Value::Object);
    let report = json!({"changed": outcome.changed, "object": object});
    println!("{}", report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_report_shape() {
        let outcome = SyncOutcome {
            changed: true,
            object: Some(Map::new()),
        };
        let object = outcome.object.clone().map_or(Value::Null, Value::Object);
        let report = json!({"changed": outcome.changed, "object": object});
        assert_eq!(report["changed"], true);
        assert!(report["object"].is_object());
    }

    #[test]
    fn test_absent_object_is_null() {
        let outcome = SyncOutcome {
            changed: false,
            object: None,
        };
        let object = outcome.object.clone().map_or(Value::Null, Value::Object);
        assert!(object.is_null());
    }
}
