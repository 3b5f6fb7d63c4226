//! The interactive console front end: the ten-item menu, colored
//! `I:`/`W:`/`E:`/`D:` log lines, and a throttled progress bar.

pub mod log;
pub mod menu;
pub mod progress;
