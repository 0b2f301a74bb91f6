//! Output formatting for the `--output` flag.
//!
//! Domain types describe how they appear in each mode through
//! [`Presentable`]; the format dispatch lives here so the command
//! handlers stay declarative. Table output uses `tabled`, structured
//! formats go through serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

/// How a domain item is shown across the output formats.
pub trait Presentable: Serialize {
    type Row: Tabled;

    /// One table row for list output.
    fn row(&self) -> Self::Row;

    /// Stable identifier for plain (scripting) output.
    fn id(&self) -> String;

    /// Single-item table view. Defaults to a one-row table; types with
    /// more fields than fit a row override this with a key/value block.
    fn detail(&self) -> String {
        rounded_table(&[self.row()])
    }
}

/// Render a collection of items in the chosen format.
pub fn list<T: Presentable>(format: &OutputFormat, items: &[T]) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<T::Row> = items.iter().map(Presentable::row).collect();
            rounded_table(&rows)
        }
        OutputFormat::Json => json(items, false),
        OutputFormat::JsonCompact => json(items, true),
        OutputFormat::Yaml => yaml(items),
        OutputFormat::Plain => items
            .iter()
            .map(Presentable::id)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render one item in the chosen format.
pub fn single<T: Presentable>(format: &OutputFormat, item: &T) -> String {
    match format {
        OutputFormat::Table => item.detail(),
        OutputFormat::Json => json(item, false),
        OutputFormat::JsonCompact => json(item, true),
        OutputFormat::Yaml => yaml(item),
        OutputFormat::Plain => item.id(),
    }
}

/// Write rendered output to stdout unless `--quiet` suppressed it.
pub fn emit(rendered: &str, quiet: bool) {
    if quiet || rendered.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{rendered}");
}

/// Whether warnings on stderr should carry color codes.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

pub(crate) fn rounded_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.expect("serialization should not fail")
}

fn yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct Item {
        imei: &'static str,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "IMEI")]
        imei: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    impl Presentable for Item {
        type Row = ItemRow;

        fn row(&self) -> ItemRow {
            ItemRow {
                imei: self.imei.into(),
                name: self.name.into(),
            }
        }

        fn id(&self) -> String {
            self.imei.into()
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                imei: "860000000000001",
                name: "Truck",
            },
            Item {
                imei: "860000000000002",
                name: "Van",
            },
        ]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = list(&OutputFormat::Plain, &items());
        assert_eq!(out, "860000000000001\n860000000000002");
    }

    #[test]
    fn json_serializes_the_items_not_the_rows() {
        let out = list(&OutputFormat::JsonCompact, &items());
        assert_eq!(
            out,
            r#"[{"imei":"860000000000001","name":"Truck"},{"imei":"860000000000002","name":"Van"}]"#
        );
    }

    #[test]
    fn table_includes_headers_and_values() {
        let out = list(&OutputFormat::Table, &items());
        assert!(out.contains("IMEI"));
        assert!(out.contains("Truck"));
        assert!(out.contains("860000000000002"));
    }

    #[test]
    fn single_defaults_to_a_one_row_table() {
        let out = single(
            &OutputFormat::Table,
            &Item {
                imei: "860000000000001",
                name: "Truck",
            },
        );
        assert!(out.contains("Name"));
        assert!(out.contains("Truck"));
    }
}
