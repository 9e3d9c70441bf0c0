pub mod builder;
pub mod handlers;

#[cfg(test)]
mod tests;

pub use builder::{create_invoice, get_invoice, list_invoices};
pub use handlers::{invoice_pdf_handler, invoices_get_handler, invoices_post_handler};
