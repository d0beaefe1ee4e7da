pub mod mortgage_file;
