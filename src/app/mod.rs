pub mod ports;
pub mod sync_use_case;
pub mod push_use_case;
pub mod enrich_use_case;
