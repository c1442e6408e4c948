pub mod worksheet_fetcher;

pub use worksheet_fetcher::WorksheetFetcher;
