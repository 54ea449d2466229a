// Latest-known entity state (items, units, main-item index)

mod store;

pub use store::EntityStore;
