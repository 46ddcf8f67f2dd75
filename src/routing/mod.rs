//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request target ("/hdrs?htm=1&cols=HTd")
//!     → request.rs (endpoint lookup, query args, render mode)
//!     → router.rs (ACL gate, handler call, status mapping)
//!     → Return: Reply (status + rendered body)
//!
//! Route table (at startup):
//!     handlers::ROUTES (static name → handler list)
//!     → Freeze as immutable RouteTable
//! ```

pub mod request;
pub mod router;

pub use request::ParsedRequest;
pub use router::{Dispatcher, Handler, Route, RouteTable};
