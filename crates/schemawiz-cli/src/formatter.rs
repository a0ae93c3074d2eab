//! Output formatters for resolved graphs.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use schemawiz_core::{Column, Entity, ModelGraph, ResolveError};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII tables per entity
    Table,
    /// The full graph as JSON
    Json,
    /// Entity keys in dependency order
    Order,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Order => write!(f, "order"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a resolved graph.
    fn format_graph(&self, graph: &ModelGraph) -> String;

    /// Format a resolution error.
    fn format_error(&self, error: &ResolveError) -> String {
        format!("error[{}]: {}", error.kind.tag(), error.message)
    }
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Order => Box::new(OrderFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_graph(&self, graph: &ModelGraph) -> String {
        let mut sections: Vec<String> = graph.ordered().map(format_entity).collect();

        if graph.morph_groups().next().is_some() {
            let mut table = Table::new();
            table.set_header(vec!["Morph", "Parents", "Children", "Columns", "Pivot"]);
            for group in graph.morph_groups() {
                table.add_row(vec![
                    Cell::new(&group.name),
                    Cell::new(group.parents.join(", ")),
                    Cell::new(group.children.join(", ")),
                    Cell::new(format!(
                        "{} ({})",
                        group.id_column,
                        group.shape.id_type()
                    )),
                    Cell::new(group.pivot.as_deref().unwrap_or("-")),
                ]);
            }
            sections.push(format!("Morph groups\n{}", table));
        }

        for pivot in graph.pivots() {
            let mut table = Table::new();
            table.set_header(vec!["Column", "Type", "Nullable"]);
            for column in pivot.columns.values() {
                table.add_row(column_cells(column).into_iter().take(3));
            }
            let owner = pivot.entity.as_deref().unwrap_or("table only");
            sections.push(format!("Pivot {} [{}]\n{}", pivot.table, owner, table));
        }

        if sections.is_empty() {
            "No models".to_string()
        } else {
            sections.join("\n\n")
        }
    }
}

fn column_cells(column: &Column) -> Vec<Cell> {
    let mut flags = Vec::new();
    if column.primary {
        flags.push("primary".to_string());
    }
    if column.unique {
        flags.push("unique".to_string());
    }
    if column.indexed {
        flags.push("index".to_string());
    }
    if let Some(default) = &column.default {
        flags.push(format!("default {}", default));
    }

    vec![
        Cell::new(&column.name),
        Cell::new(column.column_type.to_string()),
        Cell::new(if column.nullable { "yes" } else { "no" }),
        Cell::new(flags.join(", ")),
        Cell::new(column.comment.as_deref().unwrap_or("")),
    ]
}

fn format_entity(entity: &Entity) -> String {
    let mut columns = Table::new();
    columns.set_header(vec!["Column", "Type", "Nullable", "Flags", "Comment"]);
    for column in entity.columns.values() {
        columns.add_row(column_cells(column));
    }

    let mut output = format!("{} ({})\n{}", entity.fqcn(), entity.table, columns);

    if !entity.relations.is_empty() {
        let mut relations = Table::new();
        relations.set_header(vec!["Relation", "Kind", "Target", "Foreign key", "Inverse"]);
        for relation in entity.relations.values() {
            let target = match (&relation.target, relation.morph_targets.is_empty()) {
                (Some(target), _) => target.clone(),
                (None, false) => relation.morph_targets.join(" | "),
                (None, true) => "-".to_string(),
            };
            let inverse = relation
                .inverse
                .as_ref()
                .map(|r| format!("{}.{}", r.entity, r.relation))
                .unwrap_or_else(|| "-".to_string());
            relations.add_row(vec![
                Cell::new(&relation.name),
                Cell::new(relation.kind),
                Cell::new(target),
                Cell::new(relation.foreign_key.as_deref().unwrap_or("-")),
                Cell::new(inverse),
            ]);
        }
        output.push('\n');
        output.push_str(&relations.to_string());
    }

    output
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_graph(&self, graph: &ModelGraph) -> String {
        serde_json::to_string_pretty(graph).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &ResolveError) -> String {
        serde_json::json!({
            "error": error.kind.tag(),
            "message": error.message
        })
        .to_string()
    }
}

/// Dependency order formatter, one entity key per line.
pub struct OrderFormatter;

impl Formatter for OrderFormatter {
    fn format_graph(&self, graph: &ModelGraph) -> String {
        graph.order().join("\n")
    }
}
