// Adapters layer: concrete implementations for external systems (search API, workbook).

pub mod serpapi;
pub mod workbook;
