pub mod handlers;
pub mod ledger;

#[cfg(test)]
mod tests;

pub use handlers::{
    timecard_delete_handler, timecard_edit_handler, timecard_get_handler, timecard_post_handler,
    timecard_project_handler,
};
pub use ledger::{
    assign_project, clock_in, clock_out, delete_shift, edit_shift, list_shifts, shift_status,
};
