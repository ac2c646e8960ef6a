pub mod collection_writer;
pub mod location_writer;
pub mod machine_writer;
pub mod stats_writer;
pub mod token_reader;
