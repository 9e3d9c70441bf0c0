pub mod invoice_pdf;

pub use invoice_pdf::{format_currency, render_invoice, CompanyProfile};
