pub mod convert;
pub mod handlers;
pub mod logs;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod ws;

pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
