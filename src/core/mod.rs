pub mod batch_driver;
pub mod chunker;
pub mod corpus_writer;
pub mod path_filter;
pub mod summary_engine;
pub mod tree_renderer;

#[cfg(test)]
mod test_support;
