pub mod building_registry;
pub mod info_record;
pub mod role_map;
