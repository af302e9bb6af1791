//! Askama templates for the dashboard UI.

use crate::listing::ListedRow;
use crate::orders::Order;
use askama::Template;

/// Base data available to all session-gated templates
pub struct BaseContext {
    pub email: String,
}

/// Login page template
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub aviso: Option<String>,
}

/// Registration page template
#[derive(Template)]
#[template(path = "cadastro.html")]
pub struct CadastroTemplate {
    pub error: Option<String>,
}

/// Dashboard page template
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub base: BaseContext,
}

/// Generic external-table listing template
#[derive(Template)]
#[template(path = "tabela.html")]
pub struct TabelaTemplate {
    pub base: BaseContext,
    pub title: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<ListedRow>,
}

/// Demo order list template
#[derive(Template)]
#[template(path = "pedidos.html")]
pub struct PedidosTemplate {
    pub base: BaseContext,
    pub orders: Vec<Order>,
    pub aviso: Option<String>,
}

/// Demo order detail template
#[derive(Template)]
#[template(path = "pedido_detalhe.html")]
pub struct PedidoDetalheTemplate {
    pub base: BaseContext,
    pub order: Order,
}

/// Shipping placeholder page
#[derive(Template)]
#[template(path = "envios.html")]
pub struct EnviosTemplate {
    pub base: BaseContext,
}

/// Reports placeholder page
#[derive(Template)]
#[template(path = "relatorios.html")]
pub struct RelatoriosTemplate {
    pub base: BaseContext,
}

/// Settings placeholder page
#[derive(Template)]
#[template(path = "configuracoes.html")]
pub struct ConfiguracoesTemplate {
    pub base: BaseContext,
}
