//! Generic row lister: normalizes heterogeneous external rows into a fixed
//! display shape.
//!
//! Each list page is described by a [`TableSpec`]: the external table name,
//! the candidate field names for the row ID, and an ordered set of columns.
//! Field names vary between tables (`id_entrega` vs `id`), so every logical
//! attribute carries an ordered candidate list and the first present name
//! wins. Absent fields render as the column's default instead of failing
//! the page.
//!
//! Fetch failures are deliberately fail-open: a broken external service
//! degrades a display-only page to "no data", never to an error response.

use crate::supabase::{ExternalRow, TableFetcher};
use serde_json::Value;
use tracing::error;

/// One display column: header text, candidate field names in lookup order,
/// and the value rendered when every candidate is absent.
pub struct ColumnSpec {
    pub header: &'static str,
    pub candidates: &'static [&'static str],
    pub default: &'static str,
}

/// Display description of one external table.
pub struct TableSpec {
    /// External table name passed to the fetcher.
    pub table: &'static str,
    /// Page title.
    pub title: &'static str,
    /// Candidate field names for the row identifier.
    pub id_candidates: &'static [&'static str],
    /// Ordered display columns.
    pub columns: &'static [ColumnSpec],
    /// Row limit requested from the external service.
    pub limit: u32,
}

impl TableSpec {
    /// Column headers in display order.
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }
}

pub const CLIENTES: TableSpec = TableSpec {
    table: "clientes",
    title: "Clientes",
    id_candidates: &["id_cliente"],
    columns: &[
        ColumnSpec { header: "Nome", candidates: &["nome"], default: "-" },
        ColumnSpec { header: "Endereço", candidates: &["endereco"], default: "-" },
        ColumnSpec { header: "Telefone", candidates: &["telefone"], default: "-" },
        ColumnSpec { header: "Email", candidates: &["email"], default: "-" },
    ],
    limit: 100,
};

pub const PRODUTOS: TableSpec = TableSpec {
    table: "produtos",
    title: "Produtos",
    id_candidates: &["id_produto"],
    columns: &[
        ColumnSpec { header: "Nome", candidates: &["nome"], default: "-" },
        ColumnSpec { header: "Descrição", candidates: &["descricao"], default: "-" },
        ColumnSpec { header: "Preço", candidates: &["preco"], default: "0" },
        ColumnSpec { header: "Estoque", candidates: &["estoque"], default: "0" },
        ColumnSpec { header: "Peso (kg)", candidates: &["kg_produto"], default: "0" },
    ],
    limit: 100,
};

pub const MOTORISTAS: TableSpec = TableSpec {
    table: "motoristas",
    title: "Motoristas",
    id_candidates: &["id_motorista", "id"],
    columns: &[
        ColumnSpec { header: "Nome", candidates: &["nome"], default: "-" },
        ColumnSpec { header: "CNH", candidates: &["cnh"], default: "-" },
        ColumnSpec { header: "Telefone", candidates: &["telefone"], default: "-" },
        ColumnSpec { header: "Status", candidates: &["status"], default: "-" },
    ],
    limit: 100,
};

pub const VEICULOS: TableSpec = TableSpec {
    table: "veiculos",
    title: "Veículos",
    id_candidates: &["id_veiculo", "id"],
    columns: &[
        ColumnSpec { header: "Placa", candidates: &["placa"], default: "-" },
        ColumnSpec { header: "Modelo", candidates: &["modelo"], default: "-" },
        ColumnSpec { header: "Capacidade (kg)", candidates: &["capacidade_kg", "capacidade"], default: "0" },
        ColumnSpec { header: "Status", candidates: &["status"], default: "-" },
    ],
    limit: 100,
};

pub const ENTREGAS: TableSpec = TableSpec {
    table: "entregas",
    title: "Entregas",
    id_candidates: &["id_entrega", "id"],
    columns: &[
        ColumnSpec { header: "Cliente", candidates: &["id_cliente"], default: "0" },
        ColumnSpec { header: "Motorista", candidates: &["id_motorista"], default: "0" },
        ColumnSpec { header: "Veículo", candidates: &["id_veiculo"], default: "0" },
        ColumnSpec { header: "Data", candidates: &["data_entrega", "data"], default: "-" },
        ColumnSpec { header: "Status", candidates: &["status"], default: "-" },
    ],
    limit: 200,
};

pub const ITENS_ENTREGA: TableSpec = TableSpec {
    table: "itens_entrega",
    title: "Itens de Entrega",
    id_candidates: &["id_item", "id"],
    columns: &[
        ColumnSpec { header: "Entrega", candidates: &["id_entrega"], default: "0" },
        ColumnSpec { header: "Produto", candidates: &["id_produto"], default: "0" },
        ColumnSpec { header: "Quantidade", candidates: &["quantidade", "qtd"], default: "0" },
    ],
    limit: 200,
};

/// One normalized display row.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedRow {
    pub id: String,
    pub cols: Vec<String>,
}

/// Fetch and normalize rows for a table spec.
///
/// One output entry per fetched row, in server order; no deduplication, no
/// caching. On fetch failure the error is logged and the page gets an
/// empty list.
pub async fn list_rows(fetcher: &dyn TableFetcher, spec: &TableSpec) -> Vec<ListedRow> {
    let rows = match fetcher.fetch_rows(spec.table, spec.limit).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(table = spec.table, error = %e, "External table fetch failed; showing empty list");
            return Vec::new();
        }
    };

    rows.iter().map(|row| normalize_row(row, spec)).collect()
}

/// Map one external row onto the spec's fixed column order.
fn normalize_row(row: &ExternalRow, spec: &TableSpec) -> ListedRow {
    let id = resolve(row, spec.id_candidates)
        .map(render_value)
        .unwrap_or_else(|| "0".to_string());

    let cols = spec
        .columns
        .iter()
        .map(|col| {
            resolve(row, col.candidates)
                .map(render_value)
                .unwrap_or_else(|| col.default.to_string())
        })
        .collect();

    ListedRow { id, cols }
}

/// First present (non-null) candidate field wins.
fn resolve<'a>(row: &'a ExternalRow, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|name| row.get(*name))
        .filter(|v| !v.is_null())
}

/// Render a scalar JSON value for display.
///
/// Integral floats lose the trailing `.0`; other shapes fall back to their
/// JSON text.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && n.as_i64().is_none() {
                    return format!("{}", f as i64);
                }
            }
            n.to_string()
        }
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
