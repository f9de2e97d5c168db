//! Interactive menu (rustyline)

mod session;

pub use session::ReplSession;
