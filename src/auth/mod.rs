pub mod actor;
pub mod level;
pub mod permissions;

pub use actor::Actor;
pub use level::AuthLevel;
pub use permissions::{
    can_bulk_import, can_delete_event, can_delete_section, can_delete_workshop,
    can_transfer_ownership, can_update_event, can_update_section, can_update_user_city,
    can_update_workshop, evaluate, PrivilegedOperation, ResourceContext, ResourceFamily,
};
