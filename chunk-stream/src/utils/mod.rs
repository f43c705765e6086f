pub mod rate_counting_reader;
