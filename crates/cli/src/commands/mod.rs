pub mod duplicates;
pub mod groups;
pub mod similar;
