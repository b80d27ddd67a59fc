mod core;
mod list_endpoint;
mod pay_endpoint;

pub use core::{
    CENT_TOLERANCE, Invoice, InvoiceId, InvoiceStatus, add_to_invoice_total,
    create_invoice_table, find_or_create_invoice, get_invoice, get_invoices,
};
pub use list_endpoint::{get_invoice_endpoint, list_invoices_endpoint};
pub use pay_endpoint::pay_invoice_endpoint;
