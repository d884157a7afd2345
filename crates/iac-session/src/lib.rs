//! Client-side analysis session orchestrator.
//!
//! A session revolves around one uploaded image (the artifact) and four
//! independently failing backend stages:
//!
//! - **Upload**: fingerprints, metadata and the ELA rendering
//! - **AI analysis**: a forgery verdict on the extracted metadata
//! - **Verification**: a heuristic authenticity score
//! - **Simulation**: re-running the consistency checks on edited metadata
//!
//! The architecture follows the Elm pattern: State → Message → Update → View.
//!
//! - [`SessionStore`] is the only mutable state. Each stage is an explicit
//!   [`StageState`] machine (`Idle`, `Pending`, `Succeeded`, `Failed`).
//! - [`Message`]s are handled by one controller per stage (see [`handler`]),
//!   which check preconditions, mutate only their own slot and return a
//!   [`Task`] describing the backend request to run.
//! - [`invalidation`] is the rule table deciding which slots become stale when
//!   the artifact changes, an upload restarts or simulation mode toggles.
//! - [`project`] is a pure function from the store to a [`SessionView`].
//! - [`SessionRuntime`] drives tasks cooperatively on a single thread and
//!   feeds their completions back as messages. Every request carries a
//!   [`Ticket`]; completions whose ticket no longer matches the pending slot
//!   are discarded.

pub mod error;
pub mod handler;
pub mod invalidation;
pub mod message;
pub mod runtime;
pub mod session;
pub mod stage;
pub mod store;
pub mod task;
pub mod view;

pub use error::{Result, SessionError};
pub use invalidation::{Invalidation, Slot};
pub use message::{
    AiAnalysisMessage, Message, SimulationMessage, UploadMessage, VerificationMessage,
};
pub use runtime::SessionRuntime;
pub use session::Session;
pub use stage::{Stage, StageState, StageStatus, Ticket};
pub use store::{SessionStore, SimulationState};
pub use task::Task;
pub use view::{
    Actions, AiPanel, Banner, ComparisonRow, DraftField, HashIndicator, HashPanel, MetadataPanel,
    MetadataRow, SessionView, Severity, SimulationPanel, SimulationResultsPanel, StageSummary,
    VerificationPanel, project, risk_severity,
};
