mod media_entry_repo;

pub use media_entry_repo::DieselMediaEntryRepository;
