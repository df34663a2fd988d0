mod inspect;
mod run;

pub use inspect::{history, info, show};
pub use run::{new_project, run};
