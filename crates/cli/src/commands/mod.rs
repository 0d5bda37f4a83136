pub mod alerts;
pub mod simulate;
pub mod status;
pub mod watch;
