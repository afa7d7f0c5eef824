// Storage module: spreadsheet persistence of analysed tables.

pub mod csv_table;

pub use csv_table::{load_table, save_table, CsvPersister, TablePersister};
