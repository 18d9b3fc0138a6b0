pub mod context;
pub mod points;
pub mod run;
pub mod state;
