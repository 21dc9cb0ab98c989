pub mod allocator;
pub mod component;
pub mod entity;
pub mod error;
pub mod table;
pub mod view;
pub mod world;


pub mod prelude {
    pub use crate::allocator::EntityAllocator;
    pub use crate::component::Component;
    pub use crate::component::ComponentExt;
    pub use crate::entity::Entity;
    pub use crate::error::EcsError;
    pub use crate::table::ComponentTable;
    pub use crate::view::row::Binding;
    pub use crate::view::Select;
    pub use crate::view::View;
    pub use crate::view::ViewBuilder;
    pub use crate::world::EntityBuilder;
    pub use crate::world::World;
}
