pub mod flows;
pub mod processors;
pub mod report;
pub mod types;
