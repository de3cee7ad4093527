pub mod csv {
    pub mod command_reader;
    pub mod record_writer;
}
