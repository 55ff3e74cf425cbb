pub mod media_entry_mapper;

pub use media_entry_mapper::MediaEntryRowMapper;
