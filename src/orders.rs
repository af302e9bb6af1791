//! Demo order data for the placeholder marketplace pages.
//!
//! The orders screens are static samples seeded at process start; nothing
//! here touches the database or the external service.

use std::collections::HashMap;

/// One line item in a demo order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub product: String,
    pub quantity: u32,
    pub sku: String,
    pub unit_price: f64,
}

/// One status event in a demo order's history.
#[derive(Debug, Clone)]
pub struct OrderEvent {
    pub title: String,
    pub datetime: String,
}

/// A demo marketplace order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub marketplace: String,
    pub status: String,
    pub customer_name: String,
    pub total_value: f64,
    pub address: String,
    pub items: Vec<OrderItem>,
    pub history: Vec<OrderEvent>,
}

/// In-memory, immutable store of demo orders.
pub struct OrderStore {
    orders: HashMap<String, Order>,
}

impl OrderStore {
    /// Seed the store with the fixed sample orders.
    pub fn with_demo_data() -> Self {
        let mut orders = HashMap::new();
        for order in demo_orders() {
            orders.insert(order.id.clone(), order);
        }
        Self { orders }
    }

    /// Look up an order by ID.
    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    /// All orders, sorted by ID for stable display.
    pub fn list(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        orders
    }
}

fn demo_orders() -> Vec<Order> {
    vec![
        Order {
            id: "ML-2031".to_string(),
            marketplace: "Mercado Livre".to_string(),
            status: "Aguardando coleta".to_string(),
            customer_name: "Ana Souza".to_string(),
            total_value: 189.90,
            address: "Av. Paulista, 1000 - São Paulo/SP".to_string(),
            items: vec![
                OrderItem {
                    product: "Caixa térmica 12L".to_string(),
                    quantity: 1,
                    sku: "CTX-12".to_string(),
                    unit_price: 129.90,
                },
                OrderItem {
                    product: "Fita adesiva reforçada".to_string(),
                    quantity: 3,
                    sku: "FTA-01".to_string(),
                    unit_price: 20.00,
                },
            ],
            history: vec![
                OrderEvent {
                    title: "Pedido criado".to_string(),
                    datetime: "2025-03-02 09:14".to_string(),
                },
                OrderEvent {
                    title: "Pagamento aprovado".to_string(),
                    datetime: "2025-03-02 09:20".to_string(),
                },
            ],
        },
        Order {
            id: "SH-1188".to_string(),
            marketplace: "Shopee".to_string(),
            status: "Em rota".to_string(),
            customer_name: "Carlos Pereira".to_string(),
            total_value: 74.50,
            address: "Rua das Flores, 45 - Curitiba/PR".to_string(),
            items: vec![OrderItem {
                product: "Etiquetas de envio (500un)".to_string(),
                quantity: 1,
                sku: "ETQ-500".to_string(),
                unit_price: 74.50,
            }],
            history: vec![
                OrderEvent {
                    title: "Pedido criado".to_string(),
                    datetime: "2025-03-01 15:02".to_string(),
                },
                OrderEvent {
                    title: "Coletado pela transportadora".to_string(),
                    datetime: "2025-03-02 08:40".to_string(),
                },
                OrderEvent {
                    title: "Saiu para entrega".to_string(),
                    datetime: "2025-03-03 07:55".to_string(),
                },
            ],
        },
        Order {
            id: "AM-3305".to_string(),
            marketplace: "Amazon".to_string(),
            status: "Entregue".to_string(),
            customer_name: "Beatriz Lima".to_string(),
            total_value: 312.00,
            address: "Rua do Porto, 77 - Recife/PE".to_string(),
            items: vec![
                OrderItem {
                    product: "Carrinho de carga dobrável".to_string(),
                    quantity: 1,
                    sku: "CRG-07".to_string(),
                    unit_price: 262.00,
                },
                OrderItem {
                    product: "Cinta com catraca".to_string(),
                    quantity: 2,
                    sku: "CIN-02".to_string(),
                    unit_price: 25.00,
                },
            ],
            history: vec![
                OrderEvent {
                    title: "Pedido criado".to_string(),
                    datetime: "2025-02-27 11:30".to_string(),
                },
                OrderEvent {
                    title: "Entregue".to_string(),
                    datetime: "2025-03-01 14:12".to_string(),
                },
            ],
        },
    ]
}
