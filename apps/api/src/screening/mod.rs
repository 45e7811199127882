// Request orchestration: uploads → document store → extraction → ranking → session store.
// Handlers live here too; CSV export reads a stored session, never recomputes.

pub mod handlers;
pub mod pipeline;
pub mod session;
pub mod storage;
