use crate::domain::order::Order;
use crate::domain::status::OrderType;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Flat CSV view of an order. History is not part of the report.
#[derive(Debug, Serialize)]
struct OrderRow {
    order: u64,
    r#type: OrderType,
    status: &'static str,
    version: u64,
    amount: String,
    approved_level: Option<u8>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            order: order.id.0,
            r#type: order.order_type,
            status: order.status.as_str(),
            version: order.version,
            amount: order.amount.to_string(),
            approved_level: order.approved_level().map(|level| level.value()),
        }
    }
}

/// Writes the final order table as CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderRow::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
