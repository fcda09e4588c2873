//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "FIELD")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

impl OutputFormat {
    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            OutputFormat::Table => match serde_json::to_value(data) {
                Ok(value) => println!("{}", render_table(&value)),
                Err(e) => eprintln!("Cannot render output: {}", e),
            },
        }
    }

    /// Status line for humans; structured formats stay machine readable
    pub fn notice(&self, ok: bool, message: &str) {
        if matches!(self, OutputFormat::Table) {
            if ok {
                println!("{}", message.green().bold());
            } else {
                println!("{}", message.red().bold());
            }
        }
    }
}

/// Flatten a JSON object into FIELD/VALUE rows
fn render_table(value: &serde_json::Value) -> String {
    let mut rows = Vec::new();
    flatten("", value, &mut rows);
    if rows.is_empty() {
        return "(empty)".into();
    }
    Table::new(rows).to_string()
}

fn flatten(prefix: &str, value: &serde_json::Value, rows: &mut Vec<Row>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&key, inner, rows);
            }
        }
        serde_json::Value::String(s) => rows.push(Row { key: prefix.to_string(), value: s.clone() }),
        serde_json::Value::Null => rows.push(Row { key: prefix.to_string(), value: "-".into() }),
        other => rows.push(Row { key: prefix.to_string(), value: other.to_string() }),
    }
}
