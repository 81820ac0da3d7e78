pub mod assignments;
pub mod cache;
pub mod envelope;
pub mod inline;
pub mod mutations;
pub mod participants;
pub mod query;
pub mod remote;
pub mod transport;

pub use assignments::{diff_caregivers, sync_caregivers, CaregiverDiff};
pub use cache::{QueryCache, QueryKey};
pub use envelope::{FilterCounts, FilterOption, ListPayload, Page};
pub use inline::create_case_manager_inline;
pub use mutations::{MutationGate, MutationGuard, Mutations};
pub use participants::ParticipantEditor;
pub use query::{EntityQuery, QueryState};
pub use remote::Remote;
pub use transport::{HttpTransport, Method, Request, Transport};
