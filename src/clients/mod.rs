pub mod gviz_client;

pub use gviz_client::GvizClient;
