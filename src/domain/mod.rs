pub mod notification;
pub mod request;
pub mod resource;
pub mod roles;

pub use notification::{Notification, NotificationType, RelatedRequestType};
pub use request::{
    OwnershipRequest, PendingKey, RequestKind, RequestStatus, TaggingRequest, TeamMemberRequest,
    WorkflowRequest,
};
pub use resource::{
    BracketRecord, EventRecord, SectionRecord, TagRecord, TagTarget, VideoRecord,
};
pub use roles::{Role, RoleScope};
