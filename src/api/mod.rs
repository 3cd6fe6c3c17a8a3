pub mod cache;
pub mod caller;
pub mod error;
pub mod handlers;
pub mod router;

pub use cache::UrlCache;
pub use caller::{Caller, LEVEL_HEADER, USER_HEADER, VERIFIED_HEADER};
pub use error::{status_for, ApiError, ApiResult};
pub use handlers::ApiState;
pub use router::{router, serve};
