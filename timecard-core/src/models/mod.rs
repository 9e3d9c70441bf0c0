pub mod invoice;
pub mod project;
pub mod settings;
pub mod shift;

pub use invoice::{Invoice, InvoiceLineItem};
pub use project::Project;
pub use settings::{InvoiceSettings, UserConfig};
pub use shift::{ClockInRecord, ClockOutRecord, Shift};
